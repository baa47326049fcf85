// --- File: crates/calproxy_events/src/routes.rs ---
use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::info;

use crate::gateway::EventsGateway;
use crate::handlers::{get_event_handler, list_events_handler, upsert_event_handler, EventsState};

/// Creates the router for the Events API.
///
/// Routes are relative; the backend nests them under `/api`, giving
/// `/api/Events` and `/api/Events/{id}`.
pub fn routes(gateway: Arc<EventsGateway>) -> Router {
    let state = Arc::new(EventsState { gateway });

    info!("Events routes initialized");

    Router::new()
        .route(
            "/Events",
            get(list_events_handler).post(upsert_event_handler),
        )
        .route("/Events/{id}", get(get_event_handler))
        .with_state(state)
}
