//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Errors only
//! surface from setup-time operations (configuration parsing, opening a data source, building a
//! catalog). Sampling and ray queries never fail; they degrade to "no contribution" instead.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot open '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("cannot resolve field '{name}': {reason}")]
    Resolve { name: String, reason: String },

    #[error("unknown channel '{name}'")]
    UnknownChannel { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
