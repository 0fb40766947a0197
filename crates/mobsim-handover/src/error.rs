//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or validate a scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("can't read file {path}: {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid YAML or does not match the schema.
    #[error("can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The configuration is well-formed but inconsistent.
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Failure to push link parameters or routing changes to the emulated network.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink has no interface for the candidate.
    #[error("no interface configured for candidate {0}")]
    UnknownCandidate(String),
    /// The external command could not be started.
    #[error("can't run {command}: {source}")]
    Spawn {
        /// Command line.
        command: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The external command exited with a non-zero status.
    #[error("{command} failed with {status}: {stderr}")]
    Failed {
        /// Command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
}

/// Failure to write simulation results.
#[derive(Debug, Error)]
pub enum ReportError {
    /// File system error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV serialization error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
