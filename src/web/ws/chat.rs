//! Chat WebSocket handler.
//!
//! Each upgraded socket gets a [`ChatSession`] that turns inbound frames and
//! the final close into registry changes and room broadcasts. A companion
//! writer task drains the connection's outbound queue into the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::chat::{ChatHub, ConnectionHandle, ConnectionId, Occupant};

use super::messages::{ClientMessage, JoinRequest, ServerMessage};

/// Outcome of dispatching one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The connection joined a room; `notified` occupants got the notice.
    Joined {
        /// Room joined.
        room: String,
        /// Number of other occupants notified.
        notified: usize,
    },
    /// The join was refused and the sender told why.
    JoinRejected,
    /// Chat text was relayed to the sender's room.
    Relayed {
        /// Room the text went to.
        room: String,
        /// Number of occupants it was queued on, sender included.
        delivered: usize,
    },
    /// Chat from a connection that never joined; dropped.
    NotJoined,
    /// Unrecognized message type; nothing done.
    Ignored,
    /// Frame could not be decoded; dropped.
    Malformed,
}

/// Protocol state of one connection.
///
/// Whether the connection has joined is read from the hub's registry, never
/// tracked locally.
pub struct ChatSession {
    hub: Arc<ChatHub>,
    connection: ConnectionHandle,
}

impl ChatSession {
    /// Create a session for an accepted connection.
    pub fn new(hub: Arc<ChatHub>, connection: ConnectionHandle) -> Self {
        Self { hub, connection }
    }

    /// Id of the session's connection.
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Handle one inbound text frame.
    pub async fn handle_text(&self, text: &str) -> Dispatch {
        match ClientMessage::parse(text) {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                tracing::warn!(connection = %self.id(), error = %e, "Dropping malformed frame");
                Dispatch::Malformed
            }
        }
    }

    /// Handle one decoded client message.
    pub async fn handle_message(&self, msg: ClientMessage) -> Dispatch {
        match msg {
            ClientMessage::Join(request) => self.join(request).await,
            ClientMessage::Chat { message } => self.chat(message).await,
            ClientMessage::Unknown(kind) => {
                tracing::debug!(
                    connection = %self.id(),
                    kind = %kind,
                    "Ignoring unknown message type"
                );
                Dispatch::Ignored
            }
        }
    }

    async fn join(&self, request: JoinRequest) -> Dispatch {
        let (room, username) = match request.validate() {
            Ok(fields) => fields,
            Err(e) => {
                tracing::debug!(connection = %self.id(), error = %e, "Join rejected");
                if let Some(frame) = encode(&ServerMessage::join_failed(&e)) {
                    self.connection.send(frame);
                }
                return Dispatch::JoinRejected;
            }
        };

        // No leave notice for the room being switched away from
        if let Some(previous) = self
            .hub
            .join(self.connection.clone(), room.clone(), username.clone())
            .await
        {
            tracing::debug!(
                connection = %self.id(),
                from = %previous.room,
                to = %room,
                "Occupant superseded by rejoin"
            );
        }
        tracing::info!(connection = %self.id(), room = %room, username = %username, "Joined room");

        let notified = match encode(&ServerMessage::joined(&username)) {
            Some(frame) => self.hub.broadcast(&room, &frame, Some(self.id())).await,
            None => 0,
        };
        Dispatch::Joined { room, notified }
    }

    async fn chat(&self, message: String) -> Dispatch {
        let Some(sender) = self.hub.lookup(self.id()).await else {
            tracing::debug!(connection = %self.id(), "Dropping chat from unjoined connection");
            return Dispatch::NotJoined;
        };

        let delivered = match encode(&ServerMessage::chat(message, &sender.name, &sender.room)) {
            Some(frame) => self.hub.broadcast(&sender.room, &frame, None).await,
            None => 0,
        };
        Dispatch::Relayed {
            room: sender.room,
            delivered,
        }
    }

    /// Tear down the session after the connection closed.
    ///
    /// Returns the occupant that was removed, if the connection had joined.
    pub async fn close(self) -> Option<Occupant> {
        let occupant = self.hub.leave(self.id()).await?;

        if let Some(frame) = encode(&ServerMessage::left(&occupant.name)) {
            self.hub.broadcast(&occupant.room, &frame, None).await;
        }
        tracing::info!(
            connection = %self.id(),
            room = %occupant.room,
            username = %occupant.name,
            "Left room"
        );
        Some(occupant)
    }
}

fn encode(msg: &ServerMessage) -> Option<String> {
    match msg.to_frame() {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode server message");
            None
        }
    }
}

/// WebSocket chat handler.
///
/// GET /
pub async fn chat_ws_handler(ws: WebSocketUpgrade, State(hub): State<Arc<ChatHub>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Handle a WebSocket connection until it closes.
async fn handle_socket(socket: WebSocket, hub: Arc<ChatHub>) {
    let (connection, mut outbound) = hub.open_connection();
    let id = connection.id();
    tracing::info!(connection = %id, "New client connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let session = ChatSession::new(hub, connection);

    while let Some(msg_result) = ws_receiver.next().await {
        let outcome = match msg_result {
            Ok(Message::Text(text)) => session.handle_text(&text).await,
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => session.handle_text(text).await,
                Err(e) => {
                    tracing::warn!(connection = %id, error = %e, "Dropping non-UTF-8 frame");
                    Dispatch::Malformed
                }
            },
            Ok(Message::Close(_)) => {
                tracing::debug!(connection = %id, "WebSocket closed by client");
                break;
            }
            // Ping/pong is answered by the WebSocket layer
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(connection = %id, error = %e, "WebSocket error");
                break;
            }
        };
        tracing::trace!(connection = %id, ?outcome, "Dispatched frame");
    }

    session.close().await;
    writer.abort();
    tracing::info!(connection = %id, "Client disconnected");
}
