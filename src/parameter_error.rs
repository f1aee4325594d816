//! Error handling for configuration file loading

use std::io;

use thiserror::Error;

/// Unified error to report failures while reading YAML configuration.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("IO Error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Missing Field: {0}")]
    MissingField(String),

    #[error("Wrong angle representation: {0}")]
    WrongAngle(String),

    #[error("Invalid Length: expected {expected}, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
