use crate::error::ErrorKind;
use crate::message::GuestMessage;
use crate::Messenger;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

pub const CHECK_IN_TITLE: &str = "Check in";
pub const CHECK_OUT_TITLE: &str = "Check out";

/// Handles domain events by pushing the matching notification to the guest's
/// live connection.
///
/// Notifications are ephemeral: a guest without a connection simply misses
/// them, and delivery failures are logged rather than propagated to the
/// request that published the event.
pub struct GuestEventHandler {
    messenger: Arc<Messenger>,
}

impl GuestEventHandler {
    pub fn new(messenger: Arc<Messenger>) -> Self {
        Self { messenger }
    }

    fn to_message(event: &DomainEvent) -> GuestMessage {
        match event {
            DomainEvent::GuestCheckedIn { guest, .. } => {
                GuestMessage::from_value(CHECK_IN_TITLE, guest.clone())
            }
            DomainEvent::GuestCheckedOut { guest, .. } => {
                GuestMessage::from_value(CHECK_OUT_TITLE, guest.clone())
            }
        }
    }
}

#[async_trait]
impl EventHandler for GuestEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let guest_id = event.guest_id();
        let message = Self::to_message(event);
        debug!("Notifying guest {guest_id}: {}", message.title());

        match self.messenger.send(guest_id, message).await {
            Ok(()) => debug!("Guest {guest_id} notified"),
            Err(e) if e.error_kind == ErrorKind::NoSuchConnection => {
                debug!("Guest {guest_id} is not connected, notification dropped")
            }
            Err(e) => warn!("Failed to notify guest {guest_id}: {e}"),
        }
    }
}
