use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET whether the notification service is accepting requests.
///
/// Says nothing about individual guest connections; use the connection
/// status route for those.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up and guest routes are being served", body = String),
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
