//! Web module for roomcast.
//!
//! Serves the chat relay over a single WebSocket endpoint.

pub mod router;
pub mod server;
pub mod ws;

pub use router::create_router;
pub use server::WebServer;
