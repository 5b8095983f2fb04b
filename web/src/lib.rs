use axum::http::{header, HeaderValue, Method};
use events::EventPublisher;
use log::*;
use messenger::Messenger;
use service::config::Config;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod params;
pub mod router;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub messenger: Arc<Messenger>,
    pub event_publisher: EventPublisher,
}

impl AppState {
    pub fn new(config: Config, messenger: Arc<Messenger>, event_publisher: EventPublisher) -> Self {
        Self {
            config,
            messenger,
            event_publisher,
        }
    }
}

/// Serves the router on the configured interface and port until Ctrl-C, then
/// closes every guest connection so in-flight upgrades can drain.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_address = app_state.config.listen_address();
    let cors_layer = cors_layer(&app_state.config);
    let messenger = Arc::clone(&app_state.messenger);

    let listener = tokio::net::TcpListener::bind(&listen_address).await?;
    info!("Server starting... listening for connections on http://{listen_address}");

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(shutdown_signal(messenger))
        .await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .allow_origin(origins)
}

async fn shutdown_signal(messenger: Arc<Messenger>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, closing guest connections");
    messenger.shutdown().await;
}
