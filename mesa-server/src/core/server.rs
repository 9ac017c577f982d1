use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::api::build_app;
use crate::core::{Config, ServerState};

/// HTTP server runner
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    /// Create a server that will initialize its own state on `run()`
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server with pre-initialized state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Run the HTTP server until ctrl-c
    pub async fn run(self) -> anyhow::Result<()> {
        let state = match self.state {
            Some(state) => state,
            None => ServerState::initialize(&self.config)?,
        };

        state.start_background_tasks();

        let app = build_app(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("HTTP server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
