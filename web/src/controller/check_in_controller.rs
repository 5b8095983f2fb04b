use crate::controller::ApiResponse;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use events::DomainEvent;
use serde_json::{json, Value};

use log::*;

/// POST announce that a guest has been checked in.
///
/// The request body is the checked-in guest record. The guest is notified
/// over its live connection if it has one; an offline guest misses the event.
#[utoipa::path(
    post,
    path = "/guests/{guest_id}/check_in",
    params(
        ("guest_id" = String, Path, description = "Guest id that was checked in")
    ),
    responses(
        (status = 202, description = "Check-in event published"),
        (status = 422, description = "Body is not valid JSON"),
    )
)]
pub async fn create(
    Path(guest_id): Path<String>,
    State(app_state): State<AppState>,
    Json(guest): Json<Value>,
) -> impl IntoResponse {
    info!("Guest {guest_id} checked in");

    app_state
        .event_publisher
        .publish(DomainEvent::GuestCheckedIn {
            guest_id: guest_id.clone(),
            guest,
        })
        .await;

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            StatusCode::ACCEPTED.into(),
            json!({ "guest_id": guest_id }),
        )),
    )
}
