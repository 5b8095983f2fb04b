//! Event system infrastructure for the guest notification platform.
//!
//! Request handlers publish a `DomainEvent` once the business operation they
//! perform has succeeded; infrastructure concerns (like pushing a notification
//! to the guest's live connection) subscribe as `EventHandler`s. This keeps
//! the web layer decoupled from the messenger.
//!
//! This crate has no dependencies on other internal crates. Guest records are
//! carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Identifier of a guest, as resolved by the caller.
pub type GuestId = String;

/// Business-level changes that guests should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// A guest has been checked in to an event.
    GuestCheckedIn {
        guest_id: GuestId,
        /// The checked-in guest record, forwarded to the guest as-is.
        guest: Value,
    },
    /// A guest has been checked out of an event.
    GuestCheckedOut { guest_id: GuestId, guest: Value },
}

impl DomainEvent {
    /// The guest this event concerns.
    pub fn guest_id(&self) -> &str {
        match self {
            DomainEvent::GuestCheckedIn { guest_id, .. }
            | DomainEvent::GuestCheckedOut { guest_id, .. } => guest_id,
        }
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone, Default)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a publisher with `handler` appended to the existing ones.
    /// Clones taken before this call keep their old handler list.
    pub fn with_handler(self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        Self {
            handlers: Arc::new(handlers),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}
