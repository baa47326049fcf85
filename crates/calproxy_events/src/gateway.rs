// --- File: crates/calproxy_events/src/gateway.rs ---
//! Authenticated access to the upstream Events endpoint.
//!
//! Every operation first obtains a valid token from the [`TokenManager`]. If
//! that fails, the [`AuthError`](crate::error::AuthError) is returned as
//! [`EventsError::Auth`] and no Events request is made.

use calproxy_common::create_client;
use calproxy_config::EventsConfig;
use chrono::Duration;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::broker::CredentialBroker;
use crate::clock::{Clock, SystemClock};
use crate::error::EventsError;
use crate::models::{CalendarEvent, Credentials, EventPage};
use crate::token_manager::TokenManager;

/// Client for the upstream `/{client_id}/api/Events` resource.
#[derive(Clone, Debug)]
pub struct EventsGateway {
    client: Client,
    events_url: String,
    tokens: TokenManager,
}

impl EventsGateway {
    pub fn new(client: Client, base_url: &str, client_id: &str, tokens: TokenManager) -> Self {
        let events_url = format!("{}/{}/api/Events", base_url.trim_end_matches('/'), client_id);
        Self {
            client,
            events_url,
            tokens,
        }
    }

    /// Wires the production stack: a shared HTTP client with the configured
    /// timeout, the system clock, a [`CredentialBroker`] and a [`TokenManager`].
    pub fn from_config(config: &EventsConfig) -> Result<Self, EventsError> {
        let client = create_client(config.request_timeout_secs, true)
            .map_err(|e| EventsError::Config(format!("failed to build HTTP client: {e}")))?;
        let threshold = i64::try_from(config.refresh_threshold_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                EventsError::Config(format!(
                    "refresh_threshold_secs out of range: {}",
                    config.refresh_threshold_secs
                ))
            })?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let credentials = Credentials::new(&config.client_id, &config.client_secret);
        let broker = CredentialBroker::new(
            client.clone(),
            &config.base_url,
            credentials,
            clock.clone(),
        );
        let tokens = TokenManager::new(Arc::new(broker), clock, threshold);

        Ok(Self::new(client, &config.base_url, &config.client_id, tokens))
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Fetches one page of events.
    ///
    /// # Errors
    ///
    /// * [`EventsError::Validation`] if `top` is zero
    /// * [`EventsError::Auth`] if no token could be obtained
    /// * [`EventsError::Api`] on a non-success status
    /// * [`EventsError::Parse`] if the body is not an event page
    pub async fn list_events(&self, skip: u32, top: u32) -> Result<EventPage, EventsError> {
        if top == 0 {
            return Err(EventsError::Validation(
                "top must be greater than zero".to_string(),
            ));
        }
        let token = self.tokens.get_valid_token().await?;

        // `$skip`/`$top` are sent literally, as the upstream documents them.
        let url = format!("{}?$skip={}&$top={}", self.events_url, skip, top);
        debug!(skip, top, "listing events");
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.token())
            .send()
            .await?;

        read_json(ensure_success(response, false)?).await
    }

    /// Fetches a single event by its upstream id.
    ///
    /// # Errors
    ///
    /// * [`EventsError::Validation`] if `id` is blank
    /// * [`EventsError::Api`] with `not_found` set when upstream answers 404
    pub async fn get_event(&self, id: &str) -> Result<CalendarEvent, EventsError> {
        if id.trim().is_empty() {
            return Err(EventsError::Validation("event id must not be empty".to_string()));
        }
        let url = self.event_url(id)?;
        let token = self.tokens.get_valid_token().await?;

        debug!(id, "fetching event");
        let response = self
            .client
            .get(url)
            .bearer_auth(token.token())
            .send()
            .await?;

        read_json(ensure_success(response, true)?).await
    }

    /// Creates (empty `id`) or updates an event and returns the upstream's
    /// canonical copy, which may differ from `event` (e.g. an assigned id).
    pub async fn upsert_event(&self, event: &CalendarEvent) -> Result<CalendarEvent, EventsError> {
        let token = self.tokens.get_valid_token().await?;

        debug!(id = %event.id, create = event.is_new(), "upserting event");
        let response = self
            .client
            .post(&self.events_url)
            .bearer_auth(token.token())
            .json(event)
            .send()
            .await?;

        read_json(ensure_success(response, false)?).await
    }

    /// `{events_url}/{id}` with `id` percent-encoded as a single path segment.
    fn event_url(&self, id: &str) -> Result<Url, EventsError> {
        let mut url = Url::parse(&self.events_url)
            .map_err(|e| EventsError::Config(format!("invalid events URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| EventsError::Config("events URL cannot carry a path".to_string()))?
            .push(id);
        Ok(url)
    }
}

fn ensure_success(response: Response, single_lookup: bool) -> Result<Response, EventsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!(status = status.as_u16(), url = %response.url(), "Events API returned an error");
    Err(EventsError::Api {
        status: status.as_u16(),
        not_found: single_lookup && status == StatusCode::NOT_FOUND,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, EventsError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| EventsError::Parse(e.to_string()))
}
