//! HTTP API for the bug tracker.
//!
//! Routes are served both at the root and under `/api`:
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/bugs` | [`handlers::list_bugs`] |
//! | POST | `/bugs` | [`handlers::create_bug`] |
//! | GET | `/bugs/{id}` | [`handlers::get_bug`] |
//! | PUT | `/bugs/{id}` | [`handlers::update_bug`] |
//! | DELETE | `/bugs/{id}` | [`handlers::delete_bug`] |
//! | GET | `/health` | [`handlers::health`] |

pub mod context;
pub mod error;
pub mod handlers;
pub mod monitor;
pub mod router;

pub use context::ServiceContext;
pub use error::ApiError;
pub use monitor::MemoryMonitor;
pub use router::router;

use bugtracker_rs_config::TrackerConfig;
use bugtracker_rs_store::StoreError;
use log::{error, info};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

/// Fatal errors while starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to connect record store: {0}")]
    Store(#[from] StoreError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Connect the store, bind the listener and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: TrackerConfig) -> Result<(), ServerError> {
    let address = config.server.bind_address();
    let interval_secs = config.monitor.memory_interval_secs;
    let ctx = ServiceContext::connect(config).await?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    info!(
        "server listening (address={}, environment={:?})",
        address, ctx.config.server.environment
    );

    let monitor =
        (interval_secs > 0).then(|| MemoryMonitor::start(Duration::from_secs(interval_secs)));

    let result = axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve);

    if let Some(monitor) = monitor {
        monitor.stop().await;
    }
    info!("server stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(err) => {
                error!("failed to install Ctrl+C handler (error={})", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                error!("failed to install SIGTERM handler (error={})", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
