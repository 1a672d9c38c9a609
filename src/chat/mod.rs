//! Chat module for roomcast.
//!
//! This module provides the room registry and broadcast engine:
//! - Connection handles with server-assigned ids
//! - Occupant registry (one room membership per connection)
//! - Fan-out of serialized frames to a room's open connections

pub mod broadcast;
mod connection;
mod hub;
mod registry;

pub use connection::{ConnectionHandle, ConnectionId};
pub use hub::ChatHub;
pub use registry::{Occupant, Registry};
