//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, malformed caller input, failed HUD decoding and calculations
//! requested before any sighting was recorded.
//!
//! Recoverable conditions met during inference (no matching cell, parallel rays,
//! unreadable positions) are not errors; they are reported as
//! [`crate::scoring::Diagnostic`]s on the result.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("coordinate decode failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("no throw has been recorded")]
    NoObservation,

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn decode_failed(reason: impl Into<String>) -> Self {
        Error::DecodeFailed {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors the host is expected to retry later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DecodeFailed { .. } | Error::NoObservation)
    }
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
