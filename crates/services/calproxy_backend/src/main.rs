// File: services/calproxy_backend/src/main.rs
use calproxy_common::logging;
use calproxy_config::load_config;
use calproxy_events::EventsGateway;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod app;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config = load_config()?;
    info!(events = ?config.events, "configuration loaded");

    let gateway = Arc::new(EventsGateway::from_config(&config.events)?);
    let app = app::build_app(&config.server, gateway);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
