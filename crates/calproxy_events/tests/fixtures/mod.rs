//! Test fixtures for the Events integration tests
//!
//! Builds gateways against a wiremock server standing in for the hosted
//! events API, plus canned Auth and Events payloads.
#![allow(dead_code)]

use calproxy_common::create_client;
use calproxy_events::{
    CredentialBroker, Credentials, EventsGateway, ManualClock, TokenManager,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "SomeClientId";
pub const CLIENT_SECRET: &str = "SomeClientSecret";
pub const ACCESS_TOKEN: &str = "someToken";

pub fn auth_path() -> String {
    format!("/{CLIENT_ID}/api/Auth")
}

pub fn events_path() -> String {
    format!("/{CLIENT_ID}/api/Events")
}

pub fn test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 10, 21, 8, 0, 0).unwrap(),
    ))
}

/// Gateway wired like production, but pointed at `server` and driven by a
/// manual clock.
pub fn create_gateway(server: &MockServer, clock: Arc<ManualClock>) -> EventsGateway {
    let client = create_client(5, true).unwrap();
    let broker = CredentialBroker::new(
        client.clone(),
        &server.uri(),
        Credentials::new(CLIENT_ID, CLIENT_SECRET),
        clock.clone(),
    );
    let tokens = TokenManager::new(Arc::new(broker), clock, Duration::minutes(5));
    EventsGateway::new(client, &server.uri(), CLIENT_ID, tokens)
}

pub fn token_body() -> Value {
    json!({ "access_token": ACCESS_TOKEN, "expires_in": 3600 })
}

/// Auth endpoint that accepts the test credentials and must be hit exactly
/// `times` times.
pub async fn mount_auth(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path(auth_path()))
        .and(body_json(json!({
            "ClientId": CLIENT_ID,
            "ClientSecret": CLIENT_SECRET
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(times)
        .mount(server)
        .await;
}

/// Auth endpoint that rejects every request with `status`.
pub async fn mount_auth_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(auth_path()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// An event as the upstream returns it: offset-less timestamps.
pub fn sample_event_json(id: &str) -> Value {
    json!({
        "id": id,
        "title": "someTitle",
        "description": "someDescription",
        "startDate": "2025-10-21T12:00:00",
        "endDate": "2025-10-21T13:00:00"
    })
}

pub fn sample_page_json() -> Value {
    json!({
        "total": 1,
        "items": [sample_event_json("someId")]
    })
}
