//! Error types for Flowpath.
//!
//! All errors in Flowpath are represented by the `FlowpathError` enum.
//! The first group of variants mirrors the provisioning failure taxonomy,
//! the second group covers configuration, storage and transport plumbing.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowpath operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowpathError {
    /// No path made of active links exists between the two switches.
    #[error("unable to find valid path in the network")]
    PathNotFound {
        src: String,
        dst: String,
    },

    /// A topology edge reference could not be resolved to link attributes.
    #[error("unable to resolve link: {0}")]
    Resolution(String),

    /// A port or VLAN field is not a non-negative integer in range.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The message bus rejected a command or did not acknowledge it in time.
    #[error("unable to publish command: {0}")]
    Publish(String),

    /// The flow relationship could not be recorded in the topology store.
    #[error("unable to persist flow: {0}")]
    Persistence(String),

    /// Every transit VLAN in the configured range is already issued.
    #[error("transit vlan range [{min}, {max}) is exhausted")]
    ExhaustedRange {
        min: u16,
        max: u16,
    },

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<FlowpathError> for String {
    fn from(val: FlowpathError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FlowpathError {
    fn from(error: std::io::Error) -> Self {
        FlowpathError::IoError(error.to_string())
    }
}

impl From<FlowpathError> for std::io::Error {
    fn from(val: FlowpathError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for FlowpathError {
    fn from(_: FromUtf8Error) -> Self {
        FlowpathError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for FlowpathError {
    fn from(error: serde_json::Error) -> Self {
        FlowpathError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FlowpathError {
    fn from(error: toml::de::Error) -> Self {
        FlowpathError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FlowpathError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FlowpathError::MalformedInput(error.to_string())
    }
}
