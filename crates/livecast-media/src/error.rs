//! Error types for livecast-media.
//!
//! Malformed container input is deliberately absent from this enum: the box
//! parser recovers from bad headers by byte-level resync and the keyframe
//! analyzer degrades to an indeterminate classification, so neither surfaces
//! an error. What remains are the terminal failures of a live stream.

use std::io;
use thiserror::Error;

/// Result type for livecast-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for livecast-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream byte source reported a fatal error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A segment or playlist write to the downstream store failed.
    #[error("Store write failed [{op}]: {message}")]
    Store {
        /// The store operation that failed.
        op: &'static str,
        /// Human-readable error description.
        message: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create an upstream error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a store error.
    pub fn store(op: &'static str, message: impl Into<String>) -> Self {
        Self::Store {
            op,
            message: message.into(),
        }
    }
}
