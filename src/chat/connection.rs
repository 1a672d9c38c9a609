//! Connection handles for chat clients.
//!
//! A handle pairs a server-assigned [`ConnectionId`] with the sending half of
//! the connection's outbound frame queue. The socket writer owns the receiving
//! half; once it goes away the handle reports itself as closed.

use std::fmt;

use tokio::sync::mpsc;

/// Identity of one accepted connection.
///
/// Assigned by the hub at accept time and never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create an id from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Handle to a client's outbound channel.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its frames are delivered to.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { id, sender }, receiver)
    }

    /// Get the connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether frames can still be delivered to this connection.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queue a serialized frame for the client.
    ///
    /// Returns false if the connection has already gone away.
    pub fn send(&self, frame: impl Into<String>) -> bool {
        self.sender.send(frame.into()).is_ok()
    }
}
