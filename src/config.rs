//! Simulation configuration.
//!
//! Loaded from JSON; every field has a default so an empty object is a valid
//! configuration.
//!
//! ```
//! use edgesim::config::SimulationConfig;
//! use edgesim::policy::PolicyKind;
//!
//! let config = SimulationConfig::from_json_str(r#"{"policy": "lfu", "capacity": 50}"#).unwrap();
//! assert_eq!(config.policy, PolicyKind::Lfu);
//! assert_eq!(config.capacity, 50);
//! assert_eq!(config.no_route_penalty, 1000);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::PolicyKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Eviction policy for every edge cache. Unknown names select LRU.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Entries per edge cache. Zero disables caching.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Latency charged to a request that no edge server can serve.
    #[serde(default = "default_no_route_penalty")]
    pub no_route_penalty: u64,

    /// Requests between progress log lines.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Seed for the random eviction policy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_capacity() -> usize {
    100
}

fn default_no_route_penalty() -> u64 {
    1000
}

fn default_progress_interval() -> usize {
    100
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            capacity: default_capacity(),
            no_route_penalty: default_no_route_penalty(),
            progress_interval: default_progress_interval(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(policy: PolicyKind, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_no_route_penalty(mut self, penalty: u64) -> Self {
        self.no_route_penalty = penalty;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded simulation config");
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.progress_interval == 0 {
            return Err(ConfigError::Invalid {
                field: "progress_interval",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = SimulationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.policy, PolicyKind::Lru);
        assert_eq!(config.capacity, 100);
        assert_eq!(config.progress_interval, 100);
        assert!(config.seed.is_none());
    }

    #[test]
    fn unknown_policy_name_falls_back() {
        let config = SimulationConfig::from_json_str(r#"{"policy": "ARC"}"#).unwrap();
        assert_eq!(config.policy, PolicyKind::Lru);
    }

    #[test]
    fn zero_progress_interval_is_rejected() {
        let err = SimulationConfig::from_json_str(r#"{"progress_interval": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "progress_interval",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimulationConfig::from_json_str("{capacity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"policy": "random", "capacity": 0, "seed": 17, "no_route_penalty": 500}}"#
        )
        .unwrap();
        let config = SimulationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.policy, PolicyKind::Random);
        assert_eq!(config.capacity, 0);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.no_route_penalty, 500);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SimulationConfig::from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn builder_helpers() {
        let config = SimulationConfig::new(PolicyKind::Hybrid, 8)
            .with_seed(3)
            .with_no_route_penalty(10);
        assert_eq!(config.policy, PolicyKind::Hybrid);
        assert_eq!(config.capacity, 8);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.no_route_penalty, 10);
    }
}
