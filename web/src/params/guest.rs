use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of a request to push a message to a guest.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct SendMessageParams {
    #[schema(example = "Check in")]
    pub(crate) title: String,
    /// Any JSON value; forwarded to the guest unchanged.
    #[schema(value_type = Object)]
    pub(crate) content: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ConnectionStatus {
    pub(crate) guest_id: String,
    pub(crate) connected: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DeliveryReceipt {
    pub(crate) guest_id: String,
    pub(crate) title: String,
}
