//! Record store for bug reports.
//!
//! The API layer talks to a [`BugStore`] trait object; the backend is picked
//! from `StoreConfig` by [`connect_store`].

pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

/// Store error type.
pub use error::StoreError;
/// In-process store used for development and tests.
pub use memory::MemoryBugStore;
/// MongoDB-backed store.
pub use mongo::MongoBugStore;
/// Store interface and query types.
pub use store::{BugPage, BugQuery, BugStore};

use bugtracker_rs_config::{StoreBackend, StoreConfig};
use log::info;
use std::sync::Arc;

/// Build the store selected by config. The MongoDB backend is pinged so a
/// bad URI fails at startup rather than on the first request.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn BugStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("using in-memory bug store");
            Ok(Arc::new(MemoryBugStore::new()))
        }
        StoreBackend::Mongodb => {
            let store = MongoBugStore::connect(config).await?;
            store.ping().await?;
            Ok(Arc::new(store))
        }
    }
}
