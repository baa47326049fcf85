// --- File: crates/services/calproxy_backend/src/app.rs ---
use axum::{routing::get, Router};
use calproxy_config::ServerConfig;
use calproxy_events::{routes as events_routes, EventsGateway};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Assembles the full application router.
///
/// Everything lives under `/api`. With the `openapi` feature the Swagger UI
/// is served at `/api/docs` and the document at `/api/docs/openapi.json`.
pub fn build_app(server: &ServerConfig, gateway: Arc<EventsGateway>) -> Router {
    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to the calproxy API!" }))
        .merge(events_routes::routes(gateway));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use calproxy_events::doc::EventsApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "calproxy API",
                version = "0.1.0",
                description = "Calendar events proxy",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(EventsApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let app = app.layer(TraceLayer::new_for_http());
    if server.allow_any_origin {
        info!("CORS: allowing any origin, method and header");
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
