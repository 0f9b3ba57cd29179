//! Error type for livecast-core operations.

use thiserror::Error;

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum Error {
    /// Input data failed validation or could not be parsed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
