// --- File: crates/calproxy_events/src/error.rs ---

use axum::response::{IntoResponse, Response};
use calproxy_common::{HttpStatusCode, IntoHttpResponse};
use thiserror::Error;
use tracing::{error, warn};

/// Failure of the credential exchange.
///
/// `Clone` so a single refresh failure can be handed to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Auth endpoint returned status {status}")]
    Status { status: u16 },
    #[error("Auth request failed: {0}")]
    Transport(String),
    #[error("Failed to parse auth response: {0}")]
    Parse(String),
    #[error("Token refresh ended without a result")]
    RefreshAborted,
}

/// Errors returned by [`crate::gateway::EventsGateway`] operations.
#[derive(Error, Debug)]
pub enum EventsError {
    #[error("Authentication with the events API failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Events API returned status {status}")]
    Api { status: u16, not_found: bool },
    #[error("Failed to parse events API response: {0}")]
    Parse(String),
    #[error("Events API request failed: {0}")]
    Transport(String),
    #[error("Events API request timed out")]
    Timeout,
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EventsError {
    /// True for an upstream 404 on a single-event lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EventsError::Api { not_found: true, .. })
    }
}

impl From<reqwest::Error> for EventsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EventsError::Timeout
        } else if err.is_decode() {
            EventsError::Parse(err.to_string())
        } else {
            EventsError::Transport(err.to_string())
        }
    }
}

impl HttpStatusCode for EventsError {
    fn status_code(&self) -> u16 {
        match self {
            EventsError::Auth(_) => 502,
            EventsError::Api {
                not_found: true, ..
            } => 404,
            EventsError::Api { status: 400, .. } => 400,
            EventsError::Api { .. } => 502,
            EventsError::Parse(_) => 502,
            EventsError::Transport(_) => 502,
            EventsError::Timeout => 504,
            EventsError::Validation(_) => 400,
            EventsError::Config(_) => 500,
        }
    }
}

impl IntoResponse for EventsError {
    fn into_response(self) -> Response {
        if self.status_code() >= 500 {
            error!("Events request failed: {}", self);
        } else {
            warn!("Events request rejected: {}", self);
        }
        self.into_http_response()
    }
}
