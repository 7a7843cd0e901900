//! Greeting HTTP server.
//!
//! # Responsibilities
//! - Serve `GET /` with a fixed greeting
//! - Wire up middleware (tracing, request timeout)
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{routing::get, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::lifecycle::shutdown::ShutdownListener;

/// Body returned by `GET /`.
pub const GREETING: &str = "Hello, XRPL World!";

/// HTTP server exposing the greeting route.
pub struct GreetingServer {
    router: Router,
    config: ServerConfig,
}

impl GreetingServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let router = Self::build_router(&config);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig) -> Router {
        Router::new()
            .route("/", get(hello))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run until `shutdown` fires, accepting connections on `listener`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Greeting server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("Greeting server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn hello() -> &'static str {
    GREETING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handler_returns_greeting() {
        assert_eq!(hello().await, "Hello, XRPL World!");
    }

    #[test]
    fn test_config_kept() {
        let server = GreetingServer::new(ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            request_timeout_secs: 5,
        });
        assert_eq!(server.config().request_timeout_secs, 5);
    }
}
