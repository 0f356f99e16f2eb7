//! Configuration schema for the bug tracker.

use serde::{Deserialize, Serialize};

/// Root config shared by the API server and the terminal client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl TrackerConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::new()
    }
}

/// Builder for assembling a `TrackerConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: TrackerConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the record store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the memory monitor configuration.
    pub fn monitor(mut self, monitor: MonitorConfig) -> Self {
        self.config.monitor = monitor;
        self
    }

    /// Replace the terminal client configuration.
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.config.client = client;
        self
    }

    /// Finalize and return the built `TrackerConfig`.
    pub fn build(self) -> TrackerConfig {
        self.config
    }
}

/// Deployment environment; controls how much error detail is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    /// Wire names accepted in config files and `BUGTRACKER_ENV`.
    pub const NAMES: &'static [&'static str] = &["development", "production", "test"];

    /// Parse a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Environment::Development),
            "production" => Some(Environment::Production),
            "test" => Some(Environment::Test),
            _ => None,
        }
    }

    /// True when internal error details may be returned to clients.
    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` socket address string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Record store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on restart.
    #[default]
    Memory,
    /// MongoDB collection.
    Mongodb,
}

impl StoreBackend {
    /// Wire names accepted in config files and `BUGTRACKER_STORE`.
    pub const NAMES: &'static [&'static str] = &["memory", "mongodb"];

    /// Parse a wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory" => Some(StoreBackend::Memory),
            "mongodb" => Some(StoreBackend::Mongodb),
            _ => None,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_mongodb_uri")]
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_mongodb_uri(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

fn default_mongodb_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "bugtracker".to_string()
}

fn default_collection() -> String {
    "bugs".to_string()
}

/// Periodic process memory logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between samples; 0 disables the monitor.
    #[serde(default = "default_memory_interval_secs")]
    pub memory_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            memory_interval_secs: default_memory_interval_secs(),
        }
    }
}

fn default_memory_interval_secs() -> u64 {
    300
}

/// Terminal client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
