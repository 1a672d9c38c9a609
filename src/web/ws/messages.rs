//! WebSocket message types for room chat.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Result;

/// Why an inbound frame was dropped.
#[derive(Error, Debug)]
pub enum InboundError {
    /// The frame is not a JSON object with a string `type`.
    #[error("malformed frame: {0}")]
    NotJson(#[from] serde_json::Error),

    /// A message type that needs a payload arrived without one.
    #[error("missing payload for {0:?} message")]
    MissingPayload(String),

    /// The payload does not have the shape its type requires.
    #[error("invalid {kind:?} payload: {source}")]
    InvalidPayload {
        /// Message type the payload belongs to.
        kind: String,
        /// Decoding failure.
        source: serde_json::Error,
    },
}

/// Rejection of a join request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// Room or username missing or blank.
    #[error("room and username required")]
    MissingFields,
}

/// Raw envelope every inbound frame shares.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Payload of a `join` message, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JoinRequest {
    /// Room to join.
    #[serde(rename = "roomId", default)]
    pub room_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub username: Option<String>,
}

impl JoinRequest {
    /// Require both fields to be present and not blank.
    ///
    /// Returns `(room_id, username)` exactly as sent.
    pub fn validate(self) -> std::result::Result<(String, String), JoinError> {
        match (self.room_id, self.username) {
            (Some(room_id), Some(username))
                if !room_id.trim().is_empty() && !username.trim().is_empty() =>
            {
                Ok((room_id, username))
            }
            _ => Err(JoinError::MissingFields),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Join a room under a display name.
    Join(JoinRequest),
    /// Send chat text to the current room.
    Chat {
        /// Message text.
        message: String,
    },
    /// A message type the server does not handle.
    Unknown(String),
}

impl ClientMessage {
    /// Decode an inbound text frame.
    pub fn parse(text: &str) -> std::result::Result<Self, InboundError> {
        let envelope: Envelope = serde_json::from_str(text)?;

        match envelope.kind.as_str() {
            "join" => {
                let request = match envelope.payload {
                    Some(payload) => serde_json::from_value(payload).map_err(|source| {
                        InboundError::InvalidPayload {
                            kind: envelope.kind.clone(),
                            source,
                        }
                    })?,
                    None => JoinRequest::default(),
                };
                Ok(Self::Join(request))
            }
            "chat" => {
                let payload = envelope
                    .payload
                    .ok_or_else(|| InboundError::MissingPayload(envelope.kind.clone()))?;
                let request: ChatRequest =
                    serde_json::from_value(payload).map_err(|source| {
                        InboundError::InvalidPayload {
                            kind: envelope.kind.clone(),
                            source,
                        }
                    })?;
                Ok(Self::Chat {
                    message: request.message,
                })
            }
            _ => Ok(Self::Unknown(envelope.kind)),
        }
    }
}

/// Attributed chat text as relayed to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    /// Message text.
    pub message: String,
    /// Sender's display name.
    pub sender: String,
    /// Room the message was sent to.
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// Messages sent from server to client.
///
/// `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Server-generated notice.
    System {
        /// Notice text.
        message: String,
        /// Time the notice was built.
        timestamp: i64,
    },
    /// Chat text from a room occupant.
    Chat {
        /// Message and attribution.
        payload: ChatPayload,
        /// Time the message was relayed.
        timestamp: i64,
    },
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl ServerMessage {
    /// Create a system message.
    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
            timestamp: now_millis(),
        }
    }

    /// Create a chat message.
    pub fn chat(
        message: impl Into<String>,
        sender: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self::Chat {
            payload: ChatPayload {
                message: message.into(),
                sender: sender.into(),
                room_id: room_id.into(),
            },
            timestamp: now_millis(),
        }
    }

    /// Notice announcing that a user entered the room.
    pub fn joined(username: &str) -> Self {
        Self::system(format!("{username} joined the room"))
    }

    /// Notice announcing that a user left the room.
    pub fn left(username: &str) -> Self {
        Self::system(format!("{username} left the room"))
    }

    /// Notice telling a client its join was refused.
    pub fn join_failed(error: &JoinError) -> Self {
        Self::system(format!("join failed: {error}"))
    }

    /// Serialize into a text frame.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
