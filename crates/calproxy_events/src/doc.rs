// File: crates/calproxy_events/src/doc.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models::{CalendarEvent, EventPage};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_events_handler,
        handlers::get_event_handler,
        handlers::upsert_event_handler
    ),
    components(schemas(CalendarEvent, EventPage)),
    tags(
        (name = "Events", description = "Calendar events proxied from the hosted events API")
    ),
    servers(
        (url = "/api", description = "Events API server")
    )
)]
pub struct EventsApiDoc;
