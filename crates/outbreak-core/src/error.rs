//! Error types for loading worlds and configuration.
//!
//! Only external inputs produce recoverable errors. A broken internal
//! invariant (unknown location id, missing edge at use) is a bug and panics
//! at the lookup site instead of surfacing here.

use thiserror::Error;

/// Failure to load or validate a persisted map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed map data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate location id {0} in map")]
    DuplicateNode(u32),
    #[error("edge {from}-{to} references an unknown location")]
    UnknownEndpoint { from: u32, to: u32 },
    #[error("edge {from}-{to} duplicates an existing path")]
    DuplicateEdge { from: u32, to: u32 },
    #[error("location {0} cannot have a path to itself")]
    SelfEdge(u32),
}

/// Failure to load the simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}
