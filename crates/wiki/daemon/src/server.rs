//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::{DaemonConfig, StorageConfig};
use crate::error::{DaemonError, DaemonResult};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use wiki_workflow_service::{InMemoryStorage, Storage, WorkflowService};

/// Wiki workflow daemon server
pub struct Server {
    config: DaemonConfig,
    workflows: Arc<WorkflowService>,
}

impl Server {
    /// Create a new server with the given configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        if config.workflow.event_channel_capacity == 0 {
            return Err(DaemonError::Config(
                "workflow.event_channel_capacity must be greater than zero".into(),
            ));
        }

        let storage: Arc<dyn Storage> = match config.storage {
            StorageConfig::Memory => Arc::new(InMemoryStorage::new()),
        };

        let (event_tx, _) = broadcast::channel(config.workflow.event_channel_capacity);

        let workflows = WorkflowService::new(storage, event_tx)
            .with_rejection_policy(config.workflow.rejection_policy);

        Ok(Self {
            config,
            workflows: Arc::new(workflows),
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let app = create_router(AppState::new(self.workflows.clone()));

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Wiki workflow daemon listening on {}", addr);
        tracing::info!(
            policy = ?self.workflows.rejection_policy(),
            "Rejection policy"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Wiki workflow daemon shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
