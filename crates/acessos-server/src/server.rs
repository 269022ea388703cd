//! Main API server orchestration

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use crate::api::{self, AppState};
use crate::jobs::ExpirationSweepJob;
use acessos_core::Vault;

/// HTTP API server
pub struct ApiServer {
    vault: Arc<Vault>,
}

impl ApiServer {
    pub fn new(vault: Arc<Vault>) -> Self {
        Self { vault }
    }

    pub fn router(&self) -> Router {
        api::router(AppState::new(self.vault.clone()))
    }

    /// Bind to the configured address
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        let settings = self.vault.settings();
        let addr = format!("{}:{}", settings.bind_address, settings.port);
        TcpListener::bind(&addr).await
    }

    /// Serve until `shutdown` completes, running the expiration sweep alongside
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = broadcast::channel(1);
        let interval = Duration::from_secs(self.vault.settings().sweep_interval_secs.max(1));
        let sweep = ExpirationSweepJob::new(self.vault.clone(), interval).spawn(stop_rx);

        let app = self.router();
        info!("Starting API server on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        let _ = stop_tx.send(());
        sweep.await?;

        info!("API server stopped");
        Ok(())
    }

    /// Bind to the configured address and serve until Ctrl-C
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = self.bind().await?;
        self.serve(listener, async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
    }
}
