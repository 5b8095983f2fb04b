use serde::Serialize;
pub(crate) mod check_in_controller;
pub(crate) mod guest_connection_controller;
pub(crate) mod guest_message_controller;
pub(crate) mod health_check_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn api_response_wraps_data_with_status_code() {
        let response = ApiResponse::new(StatusCode::OK.into(), json!({"connected": true}));

        // Compare as values; key order in the serialized string is not guaranteed.
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();
        assert_eq!(value, json!({"status_code": 200, "data": {"connected": true}}));
    }

    #[test]
    fn api_response_omits_missing_data() {
        let response = ApiResponse::<()> {
            status_code: StatusCode::ACCEPTED.into(),
            data: None,
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            json!({"status_code": 202}).to_string()
        );
    }
}
