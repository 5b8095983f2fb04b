use events::EventPublisher;
use log::*;
use messenger::{ConnectionSettings, GuestEventHandler, Messenger};
use service::config::Config;
use service::logging::Logger;
use std::process::ExitCode;
use std::sync::Arc;
use web::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        return ExitCode::FAILURE;
    }

    info!("Starting up in {} mode", config.runtime_env());

    let settings = match ConnectionSettings::new(
        config.guest_heartbeat_interval(),
        config.guest_write_timeout(),
        config.guest_liveness_timeout(),
    ) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid guest connection settings: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("Guest connection settings: {settings:?}");

    let messenger = Arc::new(Messenger::new(settings));
    let event_publisher = EventPublisher::new()
        .with_handler(Arc::new(GuestEventHandler::new(Arc::clone(&messenger))));

    let app_state = AppState::new(config, Arc::clone(&messenger), event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with an error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Server stopped, {} guest connection(s) remaining", messenger.connection_count());
    ExitCode::SUCCESS
}
