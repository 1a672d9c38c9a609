//! Connection registry.
//!
//! Tracks which connection occupies which room under which display name.
//! The registry itself is not synchronized; [`ChatHub`](super::ChatHub) owns
//! it behind a lock.

use std::collections::HashMap;

use super::connection::{ConnectionHandle, ConnectionId};

/// One connection's membership in a room.
#[derive(Debug, Clone)]
pub struct Occupant {
    /// The connection occupying the room.
    pub connection: ConnectionHandle,
    /// Room identifier.
    pub room: String,
    /// Display name.
    pub name: String,
}

impl Occupant {
    /// Create a new occupant.
    pub fn new(
        connection: ConnectionHandle,
        room: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            connection,
            room: room.into(),
            name: name.into(),
        }
    }

    /// Id of the occupying connection.
    pub fn connection_id(&self) -> ConnectionId {
        self.connection.id()
    }
}

/// Set of occupants keyed by connection.
///
/// Holds at most one occupant per connection.
#[derive(Debug, Default)]
pub struct Registry {
    occupants: HashMap<ConnectionId, Occupant>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a connection in a room, replacing any previous membership.
    ///
    /// Returns the superseded occupant, if the connection had joined before.
    pub fn join(
        &mut self,
        connection: ConnectionHandle,
        room: impl Into<String>,
        name: impl Into<String>,
    ) -> Option<Occupant> {
        let previous = self.occupants.remove(&connection.id());
        let occupant = Occupant::new(connection, room, name);
        self.occupants.insert(occupant.connection_id(), occupant);
        previous
    }

    /// Remove a connection's membership.
    pub fn leave(&mut self, id: ConnectionId) -> Option<Occupant> {
        self.occupants.remove(&id)
    }

    /// Look up a connection's membership.
    pub fn lookup(&self, id: ConnectionId) -> Option<&Occupant> {
        self.occupants.get(&id)
    }

    /// All occupants of a room, in no particular order.
    pub fn members_of<'a>(&'a self, room: &'a str) -> impl Iterator<Item = &'a Occupant> + 'a {
        self.occupants.values().filter(move |o| o.room == room)
    }

    /// Number of occupants across all rooms.
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Whether no connection has joined a room.
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}
