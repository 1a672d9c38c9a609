//! roomcast - room-based real-time chat relay.
//!
//! Clients connect over WebSocket, join a named room under a display name and
//! broadcast text to the other occupants of that room.

pub mod chat;
pub mod config;
pub mod error;
pub mod logging;
pub mod web;

pub use chat::{ChatHub, ConnectionHandle, ConnectionId, Occupant, Registry};
pub use config::Config;
pub use error::{RelayError, Result};
pub use web::ws::{ClientMessage, ServerMessage};
pub use web::WebServer;
