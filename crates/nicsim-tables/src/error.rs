//! Error types for the NIC table layer

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning configuration text into banks and tables.
///
/// All of these are fatal at startup: nothing is simulated until every bank
/// spec and table expression has been accepted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bucket count in '{input}': expected a positive integer")]
    InvalidBucketCount { input: String },

    #[error("invalid hash count in '{input}': expected a positive integer")]
    InvalidHashCount { input: String },

    #[error("unknown hash algorithm '{algorithm}' in '{input}'")]
    UnknownAlgorithm { input: String, algorithm: String },

    #[error("malformed bloom filter spec '{input}': {reason}")]
    InvalidSpec { input: String, reason: String },

    #[error("cannot read polynomial file {}: {source}", path.display())]
    PolynomialUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed polynomial term '{token}' at {}:{line}", path.display())]
    MalformedPolynomial {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("polynomial file {} too short: need {needed} terms, found {found}", path.display())]
    PolynomialTooShort {
        path: PathBuf,
        needed: usize,
        found: usize,
    },

    #[error("unknown table implementation '{name}'")]
    UnknownTable { name: String },

    #[error("invalid table expression '{input}': {reason}")]
    InvalidTableExpression { input: String, reason: String },

    #[error("unknown memory bank '{bank}'")]
    UnknownBank { bank: String },

    #[error("invalid configuration document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Top-level error for building and driving the simulated NIC.
#[derive(Debug, Error)]
pub enum NicError {
    #[error("invalid configuration for {origin}: {error}")]
    Configuration {
        origin: String,
        #[source]
        error: ConfigError,
    },

    #[error("{origin}: table implementation '{name}' not found")]
    TableNotFound { origin: String, name: String },

    #[error("simulation log write failed: {0}")]
    Log(#[from] std::io::Error),
}

impl NicError {
    /// Attach the configuration source (which bank, which table flag) to an error.
    pub fn at(origin: impl Into<String>, error: ConfigError) -> Self {
        let origin = origin.into();
        match error {
            ConfigError::UnknownTable { name } => NicError::TableNotFound { origin, name },
            error => NicError::Configuration { origin, error },
        }
    }

    /// Origin label of a configuration failure, if any.
    pub fn origin(&self) -> Option<&str> {
        match self {
            NicError::Configuration { origin, .. } | NicError::TableNotFound { origin, .. } => {
                Some(origin)
            }
            NicError::Log(_) => None,
        }
    }
}
