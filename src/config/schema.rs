//! Configuration schema definitions.
//!
//! All sections default, so an empty TOML file is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the generator service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// HTTP surface settings.
    pub api: ApiConfig,

    /// Snapshot cache location.
    pub cache: CacheConfig,

    /// Template set location.
    pub templates: TemplateConfig,

    /// Registry used by the merge pipeline.
    pub registry: RegistryConfig,

    /// Peer resolution pool.
    pub merge: MergeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// First path segment of `POST /{namespace}/{vendor}/{style}/{asn?}`.
    pub submit_namespace: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            submit_namespace: "ixgen".to_string(),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the `ix`, `ixlan`, `netixlan` and `net` snapshots.
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./cache"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Root of the `{vendor}/{style}/router.hbs` template sets.
    pub directory: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./templates"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of a registry mirror (e.g. "http://host/api").
    /// Unset means this process's own `/api` over loopback.
    pub url: Option<String>,

    /// Per-lookup HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Concurrent peer lookups per request (0 = available parallelism).
    pub workers: usize,

    /// Deadline for resolving one submission, in seconds.
    pub deadline_secs: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            deadline_secs: 30,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8001");
        assert_eq!(config.api.submit_namespace, "ixgen");
        assert_eq!(config.api.max_body_size, 2 * 1024 * 1024);
        assert_eq!(config.cache.directory, PathBuf::from("./cache"));
        assert_eq!(config.registry.url, None);
        assert_eq!(config.merge.workers, 0);
        assert_eq!(config.merge.deadline_secs, 30);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_sections() {
        let config: ServerConfig = toml::from_str(
            r#"
            [registry]
            url = "http://mirror.example/api"

            [merge]
            workers = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.url.as_deref(), Some("http://mirror.example/api"));
        assert_eq!(config.registry.timeout_secs, 10);
        assert_eq!(config.merge.workers, 8);
        assert_eq!(config.merge.deadline_secs, 30);
    }
}
