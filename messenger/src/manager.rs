use crate::actor::{self, ConnectionSettings};
use crate::connection::{ConnectionId, ConnectionRegistry, GuestId};
use crate::error::{Error, ErrorKind, Result};
use crate::message::{self, DeliveryTask, GuestMessage};
use crate::transport::DuplexConnection;
use futures::future::join_all;
use log::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Public entry point for pushing messages to connected guests.
///
/// Owns the guest id -> connection actor mapping and every actor's lifecycle.
/// Share it behind an `Arc`; all operations take `&self`.
pub struct Messenger {
    registry: Arc<ConnectionRegistry>,
    settings: ConnectionSettings,
    shut_down: AtomicBool,
}

impl Messenger {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            settings,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Start an actor for a freshly upgraded connection and register it under
    /// `guest_id`.
    ///
    /// Any previous connection for the same guest is superseded: it is removed
    /// from the registry in the same step that stores the new one, and this
    /// call returns only after its loops have exited and its handle is closed.
    pub async fn open_connection<C: DuplexConnection>(
        &self,
        guest_id: impl Into<GuestId>,
        connection: C,
    ) -> Result<()> {
        let guest_id = guest_id.into();
        if self.is_shut_down() {
            warn!("Rejecting connection for guest {guest_id}: messenger is shut down");
            return Err(Error::new(ErrorKind::ShutDown));
        }

        let connection_id = ConnectionId::new();
        let deregister = {
            let registry = Arc::downgrade(&self.registry);
            let guest_id = guest_id.clone();
            let connection_id = connection_id.clone();
            Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    registry.deregister(&guest_id, &connection_id);
                }
            })
        };

        let handle = actor::spawn(
            guest_id.clone(),
            connection_id.clone(),
            connection,
            self.settings,
            deregister,
        );
        info!(
            "Opened connection {} for guest {guest_id}",
            connection_id.as_str()
        );

        if let Some(previous) = self.registry.register(guest_id.clone(), handle) {
            info!(
                "Connection {} supersedes {} for guest {guest_id}",
                connection_id.as_str(),
                previous.id.as_str()
            );
            previous.close_and_wait().await;
        }

        // A shutdown that started while we registered may have drained the
        // registry before our insert; this entry would then outlive it.
        if self.is_shut_down() {
            if let Some(handle) = self.registry.take(&guest_id, &connection_id) {
                handle.close_and_wait().await;
            }
            warn!("Messenger shut down while opening connection for guest {guest_id}");
            return Err(Error::new(ErrorKind::ShutDown));
        }

        Ok(())
    }

    /// Deliver `message` to the guest and wait for the write to complete.
    ///
    /// The message is serialized before the guest is looked up, so an encoding
    /// failure is reported to this caller alone. Fails immediately with
    /// `NoSuchConnection` when the guest has no live connection. Otherwise the caller is blocked until the guest's actor has
    /// written the message (bounded by the write deadline) and receives that
    /// write's outcome.
    pub async fn send(&self, guest_id: &str, message: GuestMessage) -> Result<()> {
        let (task, outcome) = DeliveryTask::new(&message)?;
        self.registry.dispatch(guest_id, task)?;
        message::await_outcome(outcome).await
    }

    /// Build a message from typed content and `send` it.
    ///
    /// Content that cannot be represented as JSON fails with `Serialization`
    /// without touching the guest's connection.
    pub async fn send_content(
        &self,
        guest_id: &str,
        title: impl Into<String>,
        content: impl Serialize,
    ) -> Result<()> {
        let message = GuestMessage::new(title, content)?;
        self.send(guest_id, message).await
    }

    pub fn has_connection(&self, guest_id: &str) -> bool {
        self.registry.contains(guest_id)
    }

    /// Remove the guest's connection and tear its actor down.
    ///
    /// Messages already queued for the guest are written before the close
    /// frame. Returns once the actor's loops have exited.
    pub async fn close_connection(&self, guest_id: &str) -> Result<()> {
        let handle = self
            .registry
            .remove(guest_id)
            .ok_or_else(Error::no_such_connection)?;

        info!(
            "Closing connection {} for guest {guest_id}",
            handle.id.as_str()
        );
        handle.close_and_wait().await;
        Ok(())
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Close every live connection and refuse new ones.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);

        let handles = self.registry.drain();
        info!("Shutting down messenger, closing {} connection(s)", handles.len());
        join_all(handles.into_iter().map(|handle| handle.close_and_wait())).await;
    }

    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl Default for Messenger {
    fn default() -> Self {
        Self::new(ConnectionSettings::default())
    }
}
