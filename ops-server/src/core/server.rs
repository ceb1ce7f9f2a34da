//! HTTP server bootstrap with graceful shutdown

use tokio_util::sync::CancellationToken;

use super::state::ServerState;

/// Thin wrapper that binds the router and runs until shutdown
pub struct Server {
    state: ServerState,
    shutdown_token: CancellationToken,
}

impl Server {
    pub fn new(state: ServerState) -> Self {
        Self {
            state,
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Bind and serve until ctrl-c or an explicit shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            environment = %self.state.config.environment,
            "Operations server listening"
        );

        let app = crate::api::router().with_state(self.state);
        let token = self.shutdown_token.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Ctrl-C received, shutting down");
                    }
                    _ = token.cancelled() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;
        Ok(())
    }
}
