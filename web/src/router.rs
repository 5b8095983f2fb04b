use crate::controller::{
    check_in_controller, guest_connection_controller, guest_message_controller,
    health_check_controller,
};
use crate::{params, AppState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Guest Notification API"
        ),
        paths(
            health_check_controller::health_check,
            guest_connection_controller::connect,
            guest_connection_controller::read,
            guest_connection_controller::delete,
            guest_message_controller::create,
            check_in_controller::create,
        ),
        components(
            schemas(
                params::guest::SendMessageParams,
                params::guest::ConnectionStatus,
                params::guest::DeliveryReceipt,
            )
        ),
        tags(
            (name = "guest_notify_rs", description = "Real-time guest notification API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(guest_connection_routes(app_state.clone()))
        .merge(guest_message_routes(app_state.clone()))
        .merge(check_in_routes(app_state))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn guest_connection_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/guests/:guest_id/ws",
            get(guest_connection_controller::connect),
        )
        .route(
            "/guests/:guest_id/connection",
            get(guest_connection_controller::read).delete(guest_connection_controller::delete),
        )
        .with_state(app_state)
}

fn guest_message_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/guests/:guest_id/messages",
            post(guest_message_controller::create),
        )
        .with_state(app_state)
}

fn check_in_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/guests/:guest_id/check_in",
            post(check_in_controller::create),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use clap::Parser;
    use events::EventPublisher;
    use messenger::{GuestEventHandler, Messenger};
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let messenger = Arc::new(Messenger::default());
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(GuestEventHandler::new(Arc::clone(&messenger))));
        AppState::new(
            Config::parse_from(["guest_notify_rs"]),
            messenger,
            event_publisher,
        )
    }

    async fn call(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = define_routes(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_check_responds_healthy() {
        let (status, body) = call(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"healthy");
    }

    #[tokio::test]
    async fn connection_status_of_unknown_guest_is_disconnected() {
        let (status, body) = call(
            Request::builder()
                .uri("/guests/guest-1/connection")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body,
            json!({"status_code": 200, "data": {"guest_id": "guest-1", "connected": false}})
        );
    }

    #[tokio::test]
    async fn message_to_unknown_guest_is_not_found() {
        let (status, _) = call(json_request(
            "POST",
            "/guests/unknown-id/messages",
            json!({"title": "Check in", "content": {"nric": "1234", "name": "Jim Bob"}}),
        ))
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn message_without_title_is_unprocessable() {
        let (status, _) = call(json_request(
            "POST",
            "/guests/guest-1/messages",
            json!({"content": {"name": "Jim Bob"}}),
        ))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn closing_unknown_connection_is_not_found() {
        let (status, _) = call(
            Request::builder()
                .method("DELETE")
                .uri("/guests/guest-1/connection")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn plain_get_on_socket_route_is_a_bad_request() {
        let (status, _) = call(
            Request::builder()
                .uri("/guests/guest-1/ws")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn check_in_for_offline_guest_is_still_accepted() {
        let (status, body) = call(json_request(
            "POST",
            "/guests/guest-1/check_in",
            json!({"nric": "1234", "name": "Jim Bob"}),
        ))
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["data"]["guest_id"], "guest-1");
    }

    #[tokio::test]
    async fn openapi_document_lists_guest_paths() {
        let (status, body) = call(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body).unwrap();
        assert!(doc["paths"]["/guests/{guest_id}/messages"].is_object());
    }
}
