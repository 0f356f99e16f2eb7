//! Shared state handed to every handler.

use crate::ServerError;
use bugtracker_rs_config::TrackerConfig;
use bugtracker_rs_store::{BugStore, connect_store};
use log::info;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration and store shared across requests.
pub struct ServiceContext {
    pub config: TrackerConfig,
    pub store: Arc<dyn BugStore>,
    started_at: Instant,
}

impl ServiceContext {
    /// Connect the configured store and build the context.
    pub async fn connect(config: TrackerConfig) -> Result<Arc<Self>, ServerError> {
        let store = connect_store(&config.store).await?;
        info!(
            "service context ready (backend={}, environment={:?})",
            store.backend(),
            config.server.environment
        );
        Ok(Self::with_store(config, store))
    }

    /// Build a context around an existing store.
    pub fn with_store(config: TrackerConfig, store: Arc<dyn BugStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            started_at: Instant::now(),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
