//! Configuration for the translation layer and its session cache.

use crate::params::PathKeys;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How long a resolved session workspace stays cached.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session cache tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cache entry, counted from insertion
    pub ttl_secs: u64,
    /// Collapse concurrent lookups of the same uncached session into one
    /// resolver call
    pub single_flight: bool,
    /// Evict entries with a background timer instead of only on read
    pub background_eviction: bool,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            single_flight: true,
            background_eviction: true,
        }
    }
}

/// Top-level configuration, usually read from a JSON file.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPathsConfig {
    pub cache: CacheConfig,
    /// Parameter names rewritten by default
    pub path_keys: PathKeys,
}

impl SandboxPathsConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ttl_secs = config.cache.ttl_secs, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.path_keys.is_empty() {
            return Err(ConfigError::Invalid(
                "path_keys must name at least one parameter".to_string(),
            ));
        }
        Ok(())
    }
}
