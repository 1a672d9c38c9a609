//! WebSocket module for real-time room chat.
//!
//! This module provides:
//! - The JSON wire messages exchanged with clients
//! - The per-connection protocol dispatch and socket handler

pub mod chat;
pub mod messages;

pub use chat::{chat_ws_handler, ChatSession, Dispatch};
pub use messages::{ChatPayload, ClientMessage, InboundError, JoinError, JoinRequest, ServerMessage};
