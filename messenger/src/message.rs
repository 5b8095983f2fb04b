use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

/// A notification pushed to a single guest.
///
/// Serialized as `{"title": ..., "content": ...}` when it is written to the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestMessage {
    title: String,
    content: Value,
}

impl GuestMessage {
    /// Build a message from any serializable content.
    pub fn new(title: impl Into<String>, content: impl Serialize) -> Result<Self> {
        Ok(Self {
            title: title.into(),
            content: serde_json::to_value(content)?,
        })
    }

    pub fn from_value(title: impl Into<String>, content: Value) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub(crate) fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Receiving end of a delivery task's private reply slot.
pub(crate) type DeliveryOutcome = oneshot::Receiver<Result<()>>;

/// One pending write plus the slot its result is reported through.
///
/// The frame is serialized when the task is built, so a message that cannot be
/// encoded fails its own caller and never reaches the actor. Created fresh for
/// every send and consumed by `respond`, so a task can only ever unblock one
/// caller.
#[derive(Debug)]
pub(crate) struct DeliveryTask {
    title: String,
    frame: String,
    respond_to: oneshot::Sender<Result<()>>,
}

impl DeliveryTask {
    pub(crate) fn new(message: &GuestMessage) -> Result<(Self, DeliveryOutcome)> {
        let frame = message.to_wire()?;
        let (respond_to, outcome) = oneshot::channel();
        Ok((
            Self {
                title: message.title.clone(),
                frame,
                respond_to,
            },
            outcome,
        ))
    }

    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn frame(&self) -> &str {
        &self.frame
    }

    pub(crate) fn respond(self, outcome: Result<()>) {
        // The caller may have given up waiting; nothing left to report to.
        let _ = self.respond_to.send(outcome);
    }
}

/// Waits for the actor to report the result of a task.
///
/// A dropped reply slot means the actor terminated with the task still queued.
pub(crate) async fn await_outcome(outcome: DeliveryOutcome) -> Result<()> {
    outcome.await.unwrap_or_else(|_| Err(Error::connection_closed()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn wire_format_carries_title_and_content() {
        let message = GuestMessage::new(
            "Check in",
            json!({"nric": "1234", "name": "Jim Bob"}),
        )
        .unwrap();

        let wire: Value = serde_json::from_str(&message.to_wire().unwrap()).unwrap();
        assert_eq!(
            wire,
            json!({"title": "Check in", "content": {"nric": "1234", "name": "Jim Bob"}})
        );
    }

    #[derive(Serialize)]
    struct Seat {
        row: char,
        number: u8,
    }

    #[test]
    fn new_accepts_any_serializable_content() {
        let message = GuestMessage::new("Seat assigned", Seat { row: 'F', number: 12 }).unwrap();
        assert_eq!(message.title(), "Seat assigned");
        assert_eq!(message.content(), &json!({"row": "F", "number": 12}));
    }

    #[test]
    fn task_carries_the_serialized_frame() {
        let message = GuestMessage::from_value("Check out", json!({"room": "101"}));
        let (task, _outcome) = DeliveryTask::new(&message).unwrap();

        assert_eq!(task.title(), "Check out");
        assert_eq!(task.frame(), message.to_wire().unwrap());
    }

    #[test]
    fn content_with_non_string_keys_is_a_serialization_error() {
        let seats = BTreeMap::from([((1u8, 2u8), "F12")]);

        let err = GuestMessage::new("Seats", seats).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn dropped_task_reports_connection_closed() {
        let (task, outcome) = DeliveryTask::new(&GuestMessage::from_value("t", Value::Null)).unwrap();
        drop(task);

        let err = await_outcome(outcome).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::ConnectionClosed);
    }

    #[tokio::test]
    async fn respond_unblocks_the_waiting_caller() {
        let (task, outcome) = DeliveryTask::new(&GuestMessage::from_value("t", Value::Null)).unwrap();
        task.respond(Ok(()));

        assert!(await_outcome(outcome).await.is_ok());
    }
}
