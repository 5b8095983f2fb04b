use crate::controller::ApiResponse;
use crate::params::guest::{DeliveryReceipt, SendMessageParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use messenger::GuestMessage;

use log::*;

/// POST a message to a guest's live connection.
///
/// Responds only after the message has been written to the guest's socket, or
/// with the error that prevented it.
#[utoipa::path(
    post,
    path = "/guests/{guest_id}/messages",
    params(
        ("guest_id" = String, Path, description = "Guest id to deliver the message to")
    ),
    request_body = SendMessageParams,
    responses(
        (status = 200, description = "Message written to the guest's connection", body = DeliveryReceipt),
        (status = 404, description = "Guest has no live connection"),
        (status = 410, description = "Guest's connection closed before the write completed"),
        (status = 422, description = "Body is not a {title, content} object"),
        (status = 502, description = "Writing to the guest's connection failed"),
        (status = 504, description = "Writing to the guest's connection timed out"),
    )
)]
pub async fn create(
    Path(guest_id): Path<String>,
    State(app_state): State<AppState>,
    Json(params): Json<SendMessageParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST message \"{}\" to guest {guest_id}", params.title);

    let message = GuestMessage::from_value(params.title, params.content);
    let title = message.title().to_string();
    app_state.messenger.send(&guest_id, message).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DeliveryReceipt { guest_id, title },
    )))
}
