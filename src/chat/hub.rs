//! Shared chat state.
//!
//! The hub owns the registry behind a single lock and hands out connection
//! ids. It is shared by all connection tasks through an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};

use super::broadcast;
use super::connection::{ConnectionHandle, ConnectionId};
use super::registry::{Occupant, Registry};

/// Registry and broadcast engine shared across connections.
///
/// Mutations take the write lock. Lookups and whole broadcasts take the read
/// lock, so a broadcast never observes a membership change halfway through.
pub struct ChatHub {
    /// Occupants indexed by connection.
    registry: RwLock<Registry>,
    /// Next connection id to hand out.
    next_id: AtomicU64,
}

impl ChatHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate an id and outbound queue for a newly accepted connection.
    ///
    /// Nothing enters the registry until the connection joins. Returns the
    /// handle and the receiver the socket writer drains.
    pub fn open_connection(&self) -> (ConnectionHandle, mpsc::UnboundedReceiver<String>) {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        ConnectionHandle::channel(id)
    }

    /// Place a connection in a room, replacing any previous membership.
    pub async fn join(
        &self,
        connection: ConnectionHandle,
        room: impl Into<String>,
        name: impl Into<String>,
    ) -> Option<Occupant> {
        self.registry.write().await.join(connection, room, name)
    }

    /// Remove a connection's membership, if it had one.
    pub async fn leave(&self, id: ConnectionId) -> Option<Occupant> {
        self.registry.write().await.leave(id)
    }

    /// Look up a connection's membership.
    pub async fn lookup(&self, id: ConnectionId) -> Option<Occupant> {
        self.registry.read().await.lookup(id).cloned()
    }

    /// Snapshot of a room's occupants.
    pub async fn members_of(&self, room: &str) -> Vec<Occupant> {
        self.registry.read().await.members_of(room).cloned().collect()
    }

    /// Number of occupants across all rooms.
    pub async fn occupant_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Deliver a serialized frame to the open occupants of a room.
    ///
    /// Returns the number of connections the frame was queued on.
    pub async fn broadcast(&self, room: &str, frame: &str, exclude: Option<ConnectionId>) -> usize {
        let registry = self.registry.read().await;
        let delivered = broadcast::deliver(registry.members_of(room), frame, exclude);
        tracing::trace!(room, delivered, "Broadcast frame");
        delivered
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
