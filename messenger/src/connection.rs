use crate::actor::ConnectionHandle;
use crate::error::{Error, Result};
use crate::message::DeliveryTask;
use dashmap::DashMap;
use log::*;

// Guest identifiers arrive already resolved from the web layer.
pub type GuestId = String;

/// Unique identifier for one live connection (server-generated).
///
/// Distinguishes a guest's current connection from a superseded one, so a
/// late deregistration never removes the connection that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Guest id -> live connection actor.
///
/// Every operation goes through the map's per-key locking, which makes it the
/// registry's single critical section: enqueueing a task holds a read guard on
/// the entry, so it can never interleave with that entry being removed or
/// replaced.
pub(crate) struct ConnectionRegistry {
    connections: DashMap<GuestId, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Store a connection, returning the one it superseded, if any.
    pub(crate) fn register(
        &self,
        guest_id: GuestId,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        self.connections.insert(guest_id, handle)
    }

    /// Remove the guest's entry only if it still belongs to `connection_id`.
    pub(crate) fn deregister(&self, guest_id: &str, connection_id: &ConnectionId) -> bool {
        match self.take(guest_id, connection_id) {
            Some(_) => {
                debug!(
                    "Deregistered connection {} for guest {guest_id}",
                    connection_id.as_str()
                );
                true
            }
            None => false,
        }
    }

    /// Like `deregister`, but hands the removed handle back to the caller.
    pub(crate) fn take(
        &self,
        guest_id: &str,
        connection_id: &ConnectionId,
    ) -> Option<ConnectionHandle> {
        self.connections
            .remove_if(guest_id, |_, handle| &handle.id == connection_id)
            .map(|(_, handle)| handle)
    }

    pub(crate) fn remove(&self, guest_id: &str) -> Option<ConnectionHandle> {
        self.connections.remove(guest_id).map(|(_, handle)| handle)
    }

    /// Hand a task to the guest's actor without blocking.
    pub(crate) fn dispatch(&self, guest_id: &str, task: DeliveryTask) -> Result<()> {
        let handle = self
            .connections
            .get(guest_id)
            .ok_or_else(Error::no_such_connection)?;

        handle
            .tasks
            .send(task)
            .map_err(|_| Error::connection_closed())
    }

    pub(crate) fn contains(&self, guest_id: &str) -> bool {
        self.connections.contains_key(guest_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.connections.len()
    }

    /// Remove every entry.
    pub(crate) fn drain(&self) -> Vec<ConnectionHandle> {
        let guest_ids: Vec<GuestId> = self
            .connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        guest_ids
            .iter()
            .filter_map(|guest_id| self.remove(guest_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{self, ConnectionSettings};
    use crate::error::ErrorKind;
    use crate::message::GuestMessage;
    use crate::test_support::{mock_connection, MockPeer};
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time;

    fn spawn_handle(guest_id: &str) -> (ConnectionHandle, MockPeer) {
        let (connection, peer) = mock_connection();
        let handle = actor::spawn(
            guest_id.to_string(),
            ConnectionId::new(),
            connection,
            ConnectionSettings::default(),
            Box::new(|| {}),
        );
        (handle, peer)
    }

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[tokio::test]
    async fn deregister_ignores_superseded_connection_id() {
        let registry = ConnectionRegistry::new();
        let (first, _first_peer) = spawn_handle("guest-1");
        let first_id = first.id.clone();
        assert!(registry.register("guest-1".into(), first).is_none());

        let (second, _second_peer) = spawn_handle("guest-1");
        let second_id = second.id.clone();
        let superseded = registry.register("guest-1".into(), second);
        assert_eq!(superseded.map(|h| h.id), Some(first_id.clone()));

        assert!(!registry.deregister("guest-1", &first_id));
        assert!(registry.contains("guest-1"));

        assert!(registry.deregister("guest-1", &second_id));
        assert!(!registry.contains("guest-1"));
    }

    #[tokio::test]
    async fn dispatch_to_unknown_guest_fails_immediately() {
        let registry = ConnectionRegistry::new();
        let (task, _outcome) = DeliveryTask::new(&GuestMessage::from_value("t", Value::Null)).unwrap();

        let err = registry.dispatch("nobody", task).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::NoSuchConnection);
    }

    #[tokio::test]
    async fn dispatch_to_stopped_actor_still_registered_reports_connection_closed() {
        let registry = ConnectionRegistry::new();
        let (handle, peer) = spawn_handle("guest-1");
        registry.register("guest-1".into(), handle);
        peer.state.fail_writes(true);

        let (task, outcome) = DeliveryTask::new(&GuestMessage::from_value("t", Value::Null)).unwrap();
        registry.dispatch("guest-1", task).unwrap();
        let err = crate::message::await_outcome(outcome).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Transport);

        // The writer has exited but nothing removed the entry.
        time::timeout(Duration::from_secs(2), async {
            while !peer.state.handle_closed() {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        assert!(registry.contains("guest-1"));

        let (task, _outcome) = DeliveryTask::new(&GuestMessage::from_value("t", Value::Null)).unwrap();
        let err = registry.dispatch("guest-1", task).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::ConnectionClosed);
    }

    #[tokio::test]
    async fn take_returns_only_the_matching_connection() {
        let registry = ConnectionRegistry::new();
        let (handle, _peer) = spawn_handle("guest-1");
        let id = handle.id.clone();
        registry.register("guest-1".into(), handle);

        assert!(registry.take("guest-1", &ConnectionId::new()).is_none());
        assert_eq!(registry.take("guest-1", &id).map(|h| h.id), Some(id));
        assert!(!registry.contains("guest-1"));
    }

    #[tokio::test]
    async fn drain_empties_the_registry() {
        let registry = ConnectionRegistry::new();
        let (a, _peer_a) = spawn_handle("a");
        let (b, _peer_b) = spawn_handle("b");
        registry.register("a".into(), a);
        registry.register("b".into(), b);
        assert_eq!(registry.len(), 2);

        let drained = registry.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(registry.len(), 0);
    }
}
