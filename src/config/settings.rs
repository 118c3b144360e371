use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Document store backend ("memory")
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Cardinality cap the backend enforces on membership queries
    #[serde(default = "default_membership_query_cap")]
    pub membership_query_cap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Push transport backend ("memory")
    #[serde(default = "default_backend")]
    pub backend: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Radius in meters around the requester within which donors are
    /// eligible for an emergency broadcast
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,
    /// Chunk size for batched push-token resolution; must not exceed the
    /// store's membership query cap
    #[serde(default = "default_token_batch_size")]
    pub token_batch_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_membership_query_cap() -> usize {
    10
}

fn default_radius_meters() -> f64 {
    10_000.0
}

fn default_token_batch_size() -> usize {
    10
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("store.backend", "memory")?
            .set_default("store.membership_query_cap", 10)?
            .set_default("push.backend", "memory")?
            .set_default("broadcast.radius_meters", 10_000.0)?
            .set_default("broadcast.token_batch_size", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_HOST, SERVER_PORT, BROADCAST_RADIUS_METERS, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(","),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            membership_query_cap: default_membership_query_cap(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            token_batch_size: default_token_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 5000);

        let broadcast = BroadcastConfig::default();
        assert_eq!(broadcast.radius_meters, 10_000.0);
        assert_eq!(broadcast.token_batch_size, 10);
    }
}
