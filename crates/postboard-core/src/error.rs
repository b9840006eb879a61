//! Error types for Postboard Core
//!
//! Provides the failure taxonomy for:
//! - Resource client calls (network, server status, payload decoding)
//! - Controller operations (validation, duplicate title, missing id, busy)
//! - Configuration loading

use crate::validation::{FieldErrors, DUPLICATE_TITLE_MESSAGE};
use std::path::PathBuf;

/// Failures reported by a resource client
///
/// Cancellation is not an error; see [`crate::client::Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Request never produced a response
    #[error("network failure: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("server responded with status {status}")]
    Server { status: u16 },

    /// Payload was not of the expected shape
    #[error("unexpected payload: {0}")]
    Decode(String),

    /// Client could not be constructed from its configuration
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Check if re-invoking the same operation may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status } => *status >= 500,
            Self::Decode(_) | Self::InvalidConfig(_) => false,
        }
    }
}

/// Controller-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// One or more draft fields are invalid
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A post with a case-insensitively equal title exists
    #[error("{}", DUPLICATE_TITLE_MESSAGE)]
    DuplicateTitle,

    /// Entity reference lacks its server identifier
    #[error("missing identifier: the post has no id")]
    MissingIdentifier,

    /// Operation needs a selected post and none is selected
    #[error("no post selected")]
    NoSelection,

    /// Collection is still loading; its result would replace the change
    #[error("still loading, try again once the list is ready")]
    Busy,

    /// Resource client failed
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl BoardError {
    /// Check if the failure was resolved without contacting the network
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Client(_))
    }

    /// Field errors, for validation failures
    #[inline]
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for the schema
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
