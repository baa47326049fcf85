// --- File: crates/calproxy_events/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::EventsError;
use crate::gateway::EventsGateway;
use crate::models::{CalendarEvent, EventPage};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

// Shared state for the Events handlers
#[derive(Clone, Debug)]
pub struct EventsState {
    pub gateway: Arc<EventsGateway>,
}

/// Paging parameters for `GET /Events`.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct ListEventsQuery {
    /// Number of events to skip
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of events to return; must be greater than zero
    #[serde(default = "default_page_size")]
    pub top: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ListEventsQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            top: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Lists one page of events.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/Events", // Path relative to /api
    params(ListEventsQuery),
    responses(
        (status = 200, description = "One page of events", body = EventPage),
        (status = 400, description = "Invalid paging parameters"),
        (status = 502, description = "Authentication or upstream failure"),
        (status = 504, description = "Upstream timed out")
    ),
    tag = "Events"
))]
pub async fn list_events_handler(
    State(state): State<Arc<EventsState>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventPage>, EventsError> {
    info!("Listing events: skip={}, top={}", query.skip, query.top);
    let page = state.gateway.list_events(query.skip, query.top).await?;
    Ok(Json(page))
}

/// Fetches a single event.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/Events/{id}",
    params(
        ("id" = String, Path, description = "Upstream event id")
    ),
    responses(
        (status = 200, description = "The event", body = CalendarEvent),
        (status = 404, description = "No event with this id"),
        (status = 502, description = "Authentication or upstream failure")
    ),
    tag = "Events"
))]
pub async fn get_event_handler(
    State(state): State<Arc<EventsState>>,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, EventsError> {
    let event = state.gateway.get_event(&id).await?;
    Ok(Json(event))
}

/// Creates an event (no `id`) or updates an existing one.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/Events",
    request_body(content = CalendarEvent, example = json!({
        "title": "Quarterly review",
        "description": "Room 4",
        "startDate": "2025-10-21T12:00:00Z",
        "endDate": "2025-10-21T13:00:00Z"
    })),
    responses(
        (status = 200, description = "The stored event as returned upstream", body = CalendarEvent),
        (status = 400, description = "Upstream rejected the event"),
        (status = 502, description = "Authentication or upstream failure")
    ),
    tag = "Events"
))]
pub async fn upsert_event_handler(
    State(state): State<Arc<EventsState>>,
    Json(event): Json<CalendarEvent>,
) -> Result<Json<CalendarEvent>, EventsError> {
    info!("Upserting event (new: {})", event.is_new());
    let stored = state.gateway.upsert_event(&event).await?;
    Ok(Json(stored))
}
