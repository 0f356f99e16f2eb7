//! Environment variable overrides applied on top of file layers.

use crate::{ConfigError, Environment, StoreBackend, TrackerConfig};
use log::debug;

pub const ENV_HOST: &str = "BUGTRACKER_HOST";
pub const ENV_PORT: &str = "BUGTRACKER_PORT";
pub const ENV_ENVIRONMENT: &str = "BUGTRACKER_ENV";
pub const ENV_STORE: &str = "BUGTRACKER_STORE";
pub const ENV_MONGODB_URI: &str = "BUGTRACKER_MONGODB_URI";
pub const ENV_API_URL: &str = "BUGTRACKER_API_URL";

impl TrackerConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are
    /// ignored.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(host) = get(ENV_HOST) {
            debug!("config override from env (name={ENV_HOST})");
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            debug!("config override from env (name={ENV_PORT})");
            self.server.port = port
                .trim()
                .parse()
                .map_err(|err| invalid_env(ENV_PORT, format!("{err}")))?;
        }
        if let Some(environment) = get(ENV_ENVIRONMENT) {
            debug!("config override from env (name={ENV_ENVIRONMENT})");
            self.server.environment = Environment::parse(environment.trim()).ok_or_else(|| {
                invalid_env(
                    ENV_ENVIRONMENT,
                    format!("expected one of: {}", Environment::NAMES.join(", ")),
                )
            })?;
        }
        if let Some(backend) = get(ENV_STORE) {
            debug!("config override from env (name={ENV_STORE})");
            self.store.backend = StoreBackend::parse(backend.trim()).ok_or_else(|| {
                invalid_env(
                    ENV_STORE,
                    format!("expected one of: {}", StoreBackend::NAMES.join(", ")),
                )
            })?;
        }
        if let Some(uri) = get(ENV_MONGODB_URI) {
            debug!("config override from env (name={ENV_MONGODB_URI})");
            self.store.uri = uri;
            // a database URI only makes sense with the database backend
            if get(ENV_STORE).is_none() {
                self.store.backend = StoreBackend::Mongodb;
            }
        }
        if let Some(base_url) = get(ENV_API_URL) {
            debug!("config override from env (name={ENV_API_URL})");
            self.client.base_url = base_url;
        }
        self.validate()
    }
}

fn invalid_env(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidEnv {
        name: name.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn overrides_server_and_store() {
        let mut config = TrackerConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_PORT, "8080"),
                (ENV_ENVIRONMENT, "development"),
                (ENV_MONGODB_URI, "mongodb://db:27017"),
            ]))
            .expect("overrides");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.store.backend, StoreBackend::Mongodb);
        assert_eq!(config.store.uri, "mongodb://db:27017");
    }

    #[test]
    fn explicit_store_wins_over_uri_inference() {
        let mut config = TrackerConfig::default();
        config
            .apply_overrides_from(lookup(&[
                (ENV_STORE, "memory"),
                (ENV_MONGODB_URI, "mongodb://db:27017"),
            ]))
            .expect("overrides");
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn rejects_bad_port() {
        let mut config = TrackerConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut config = TrackerConfig::default();
        config
            .apply_overrides_from(lookup(&[(ENV_HOST, " ")]))
            .expect("overrides");
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
