use crate::controller::ApiResponse;
use crate::params::guest::ConnectionStatus;
use crate::{AppState, Error};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use log::*;

/// GET upgrade to a WebSocket over which the guest receives notifications.
///
/// A guest that is already connected is switched over to the new socket; the
/// old one is closed.
#[utoipa::path(
    get,
    path = "/guests/{guest_id}/ws",
    params(
        ("guest_id" = String, Path, description = "Guest id to open a connection for")
    ),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 400, description = "Not a valid WebSocket upgrade request"),
    )
)]
pub async fn connect(
    Path(guest_id): Path<String>,
    State(app_state): State<AppState>,
    ws: core::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<impl IntoResponse, Error> {
    let ws = ws?;
    debug!("Upgrading connection for guest {guest_id}");

    let messenger = Arc::clone(&app_state.messenger);
    let failed_guest_id = guest_id.clone();

    Ok(ws
        .on_failed_upgrade(move |e| {
            warn!("WebSocket upgrade for guest {failed_guest_id} failed: {e}");
        })
        .on_upgrade(move |socket| async move {
            if let Err(e) = messenger.open_connection(guest_id.clone(), socket).await {
                warn!("Could not open connection for guest {guest_id}: {e}");
            }
        }))
}

/// GET whether a guest currently has a live connection.
#[utoipa::path(
    get,
    path = "/guests/{guest_id}/connection",
    params(
        ("guest_id" = String, Path, description = "Guest id to look up")
    ),
    responses(
        (status = 200, description = "Connection status of the guest", body = ConnectionStatus),
    )
)]
pub async fn read(
    Path(guest_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let connected = app_state.messenger.has_connection(&guest_id);
    debug!("Guest {guest_id} connected: {connected}");

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ConnectionStatus {
            guest_id,
            connected,
        },
    )))
}

/// DELETE a guest's live connection.
#[utoipa::path(
    delete,
    path = "/guests/{guest_id}/connection",
    params(
        ("guest_id" = String, Path, description = "Guest id whose connection to close")
    ),
    responses(
        (status = 204, description = "Connection closed"),
        (status = 404, description = "Guest has no live connection"),
    )
)]
pub async fn delete(
    Path(guest_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE connection for guest {guest_id}");

    app_state.messenger.close_connection(&guest_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
