//! Test helpers for E2E tests.
//!
//! Provides TestServer, TestClient, and helper functions for driving the chat
//! relay over real WebSocket connections.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use roomcast::config::ServerConfig;
use roomcast::{ChatHub, WebServer};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a client must stay quiet to count as "received nothing".
pub const SILENCE: Duration = Duration::from_millis(200);

/// Test server bound to a random local port.
///
/// The server task lives until the test's runtime shuts down.
pub struct TestServer {
    addr: SocketAddr,
    hub: Arc<ChatHub>,
}

impl TestServer {
    /// Start a server on 127.0.0.1 with an OS-assigned port.
    pub async fn start() -> Self {
        let hub = Arc::new(ChatHub::new());
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let server = WebServer::new(&config, Arc::clone(&hub)).unwrap();
        let addr = server.run_with_addr().await.unwrap();
        wait_until_listening(addr).await;

        Self { addr, hub }
    }

    /// Address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The server's chat hub.
    pub fn hub(&self) -> &ChatHub {
        &self.hub
    }

    /// Connect a new client.
    pub async fn connect(&self) -> TestClient {
        TestClient::connect(self.addr).await
    }

    /// Wait until the registry holds exactly `count` occupants.
    pub async fn wait_for_occupants(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
        loop {
            let current = self.hub.occupant_count().await;
            if current == count {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} occupants, registry has {current}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn wait_until_listening(addr: SocketAddr) {
    let deadline = tokio::time::Instant::now() + DEFAULT_TIMEOUT;
    while TcpStream::connect(addr).await.is_err() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "server did not start listening on {addr}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// WebSocket test client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to the server at the given address.
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _response) = connect_async(format!("ws://{addr}/"))
            .await
            .expect("WebSocket handshake failed");
        Self { ws }
    }

    /// Send a raw text frame.
    pub async fn send_text(&mut self, text: &str) {
        self.ws.send(Message::text(text.to_string())).await.unwrap();
    }

    /// Send a raw binary frame.
    pub async fn send_binary(&mut self, bytes: Vec<u8>) {
        self.ws.send(Message::binary(bytes)).await.unwrap();
    }

    /// Send a JSON value as a text frame.
    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    /// Send a join request.
    pub async fn join(&mut self, room: &str, username: &str) {
        self.send_json(json!({
            "type": "join",
            "payload": {"roomId": room, "username": username}
        }))
        .await;
    }

    /// Send chat text.
    pub async fn chat(&mut self, message: &str) {
        self.send_json(json!({"type": "chat", "payload": {"message": message}}))
            .await;
    }

    /// Receive the next text frame as JSON.
    pub async fn recv_json(&mut self) -> Value {
        timeout(DEFAULT_TIMEOUT, self.next_text())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed while waiting for a frame")
    }

    /// Assert that no text frame arrives within [`SILENCE`].
    pub async fn expect_silence(&mut self) {
        if let Ok(Some(frame)) = timeout(SILENCE, self.next_text()).await {
            panic!("expected no frame, got {frame}");
        }
    }

    /// Close the connection with a close frame.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    async fn next_text(&mut self) -> Option<Value> {
        while let Some(msg) = self.ws.next().await {
            match msg.ok()? {
                Message::Text(text) => {
                    let value: Value = serde_json::from_str(&text).expect("frame is not JSON");
                    assert_outbound_shape(&value);
                    return Some(value);
                }
                Message::Close(_) => return None,
                _ => continue,
            }
        }
        None
    }
}

/// Assert that a frame matches exactly one of the two outbound shapes.
pub fn assert_outbound_shape(value: &Value) {
    let object = value.as_object().expect("frame is not a JSON object");
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();

    match object.get("type").and_then(Value::as_str) {
        Some("system") => {
            assert_eq!(keys, ["message", "timestamp", "type"]);
            assert!(object["message"].is_string());
        }
        Some("chat") => {
            assert_eq!(keys, ["payload", "timestamp", "type"]);
            let payload = object["payload"].as_object().expect("payload is not an object");
            let mut payload_keys: Vec<&str> = payload.keys().map(String::as_str).collect();
            payload_keys.sort_unstable();
            assert_eq!(payload_keys, ["message", "roomId", "sender"]);
            assert!(payload.values().all(Value::is_string));
        }
        other => panic!("unexpected frame type {other:?}"),
    }
    assert!(object["timestamp"].is_i64());
}

/// Text of a system frame.
pub fn system_text(value: &Value) -> &str {
    assert_eq!(value["type"], "system", "expected system frame: {value}");
    value["message"].as_str().unwrap()
}
