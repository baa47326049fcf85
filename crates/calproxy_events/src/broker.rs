// --- File: crates/calproxy_events/src/broker.rs ---
//! Credential exchange against the upstream Auth endpoint.
//!
//! The broker POSTs the client credentials as JSON to
//! `{base_url}/{client_id}/api/Auth` and turns the `{access_token, expires_in}`
//! reply into an [`AccessToken`]. It holds no state besides its configuration;
//! caching and single-flight refresh live in [`crate::token_manager`].

use calproxy_common::BoxFuture;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::AuthError;
use crate::models::{AccessToken, Credentials, TokenResponse};

/// Something that can produce a fresh access token.
///
/// [`CredentialBroker`] is the production implementation; tests plug in fakes.
pub trait TokenSource: Send + Sync {
    fn fetch_token(&self) -> BoxFuture<'_, AccessToken, AuthError>;
}

/// Exchanges client credentials for bearer tokens.
pub struct CredentialBroker {
    client: Client,
    auth_url: String,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl CredentialBroker {
    pub fn new(
        client: Client,
        base_url: &str,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let auth_url = format!(
            "{}/{}/api/Auth",
            base_url.trim_end_matches('/'),
            credentials.client_id()
        );
        Self {
            client,
            auth_url,
            credentials,
            clock,
        }
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    /// Performs one credential exchange.
    ///
    /// `issued_at` is stamped after the body has been parsed, so the computed
    /// expiry errs on the early side.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Transport`] if the request cannot be sent or the body cannot be read
    /// * [`AuthError::Status`] on any non-success status
    /// * [`AuthError::Parse`] if the body is not a valid token payload
    pub async fn fetch(&self) -> Result<AccessToken, AuthError> {
        debug!(url = %self.auth_url, "requesting access token");

        let response = self
            .client
            .post(&self.auth_url)
            .json(&self.credentials)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Auth endpoint rejected credentials");
            return Err(AuthError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let payload: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::Parse(e.to_string()))?;

        if payload.access_token.is_empty() {
            return Err(AuthError::Parse("access_token is empty".to_string()));
        }
        if payload.expires_in < 0 {
            return Err(AuthError::Parse(format!(
                "expires_in is negative: {}",
                payload.expires_in
            )));
        }

        let issued_at = self.clock.now();
        debug!(expires_in = payload.expires_in, "access token received");
        Ok(AccessToken::new(
            payload.access_token,
            payload.expires_in,
            issued_at,
        ))
    }
}

impl TokenSource for CredentialBroker {
    fn fetch_token(&self) -> BoxFuture<'_, AccessToken, AuthError> {
        Box::pin(self.fetch())
    }
}
