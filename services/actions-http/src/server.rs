use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::api::{create_router, ApiState};
use crate::config::ActionsConfig;

pub struct ActionsServer {
    addr: String,
    router: Router,
}

impl ActionsServer {
    pub fn new(config: ActionsConfig) -> Result<Self> {
        let addr = config.listen_addr();
        let state = ApiState::new(config).context("Failed to initialize API state")?;

        Ok(Self {
            addr,
            router: create_router(state),
        })
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.addr.parse().context("Invalid listen address")?;

        let listener = TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind to {}", addr))?;

        info!("Actions server listening on {}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        info!("Actions server stopped");
        Ok(())
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
