// --- File: crates/calproxy_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Adds a permissive CORS layer (any origin, header and method).
    #[serde(default)]
    pub allow_any_origin: bool,
}

// --- Upstream Events API Config ---
// client_secret is usually "secret_from_env" in the config files and
// resolved from EVENTS_CLIENT_SECRET at load time.
#[derive(Deserialize, Serialize, Clone)]
pub struct EventsConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_refresh_threshold_secs() -> u64 {
    DEFAULT_REFRESH_THRESHOLD_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl fmt::Debug for EventsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventsConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_threshold_secs", &self.refresh_threshold_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub events: EventsConfig,
}

impl AppConfig {
    /// Returns the names of mandatory settings that are present but empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.events.base_url.trim().is_empty() {
            missing.push("events.base_url");
        }
        if self.events.client_id.trim().is_empty() {
            missing.push("events.client_id");
        }
        if self.events.client_secret.trim().is_empty() {
            missing.push("events.client_secret");
        }
        missing
    }
}
