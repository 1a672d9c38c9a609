//! Web server for roomcast.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::chat::ChatHub;
use crate::config::ServerConfig;
use crate::Result;

use super::router::create_router;

/// WebSocket server for the chat relay.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Shared registry and broadcast engine.
    hub: Arc<ChatHub>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, hub: Arc<ChatHub>) -> Result<Self> {
        Ok(Self {
            addr: config.socket_addr()?,
            hub,
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the shared chat hub.
    pub fn hub(&self) -> Arc<ChatHub> {
        Arc::clone(&self.hub)
    }

    /// Build the router serving the chat endpoint.
    pub fn router(&self) -> Router {
        create_router(self.hub())
    }

    /// Run the web server until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Chat server listening on ws://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Chat server stopped");
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Chat server listening on ws://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Chat server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
