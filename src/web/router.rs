//! Router configuration for the chat endpoint.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::chat::ChatHub;

use super::ws::chat_ws_handler;

/// Create the router serving the WebSocket endpoint at `/`.
pub fn create_router(hub: Arc<ChatHub>) -> Router {
    Router::new()
        .route("/", get(chat_ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}
