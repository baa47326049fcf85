// --- File: crates/calproxy_events/src/lib.rs ---
//! Access to a hosted calendar events API.
//!
//! * [`broker`] exchanges client credentials for bearer tokens
//! * [`token_manager`] caches the token and serializes refreshes
//! * [`gateway`] performs authenticated list/get/upsert calls
//! * [`routes`] exposes those calls over HTTP under `/Events`

pub mod broker;
pub mod clock;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod token_manager;
#[cfg(test)]
mod token_manager_test;
pub mod token_store;

pub use broker::{CredentialBroker, TokenSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, EventsError};
pub use gateway::EventsGateway;
pub use models::{AccessToken, CalendarEvent, Credentials, EventPage};
pub use token_manager::TokenManager;
