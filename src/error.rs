//! Error types for the edgesim library.
//!
//! ## Key Components
//!
//! - [`TopologyError`]: Returned by [`TopologyBuilder`](crate::topology::TopologyBuilder)
//!   when the declared graph is malformed (duplicate ids, dangling links, no origin).
//! - [`ConfigError`]: Returned when a simulation configuration cannot be read,
//!   parsed, or validated.
//! - [`InvariantError`]: Returned by the `check_invariants` methods on the
//!   eviction policies when internal bookkeeping is inconsistent.
//!
//! The simulation itself never fails: unreachable clients, missing paths,
//! unknown policy names and zero-capacity caches are all handled in-band.
//!
//! ## Example Usage
//!
//! ```
//! use edgesim::error::TopologyError;
//! use edgesim::topology::{NodeRole, TopologyBuilder};
//!
//! let err = TopologyBuilder::new()
//!     .node("edge_a", NodeRole::Edge, "Boston", "US")
//!     .build()
//!     .unwrap_err();
//! assert_eq!(err, TopologyError::NoOrigin);
//! ```

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// TopologyError
// ---------------------------------------------------------------------------

/// Error returned when a topology cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("node `{0}` declared more than once")]
    DuplicateNode(String),

    #[error("link `{from}` <-> `{to}` references undeclared node `{missing}`")]
    UnknownEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("node `{0}` cannot be linked to itself")]
    SelfLink(String),

    #[error("topology has no origin node")]
    NoOrigin,
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when simulation configuration is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}
