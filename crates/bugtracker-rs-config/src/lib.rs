//! Configuration models and layered config loading.
//!
//! This crate owns the bug tracker config schema, validation, layer merging
//! and environment overrides used by both the server and the terminal client.

mod env;
mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
