//! livecast-core: configuration, typed IDs, and the shared error type.
//!
//! This crate carries the pieces every other livecast crate needs without
//! pulling in media parsing or I/O: the JSON application config, the
//! [`StreamId`] newtype used to address per-stream storage, and a small
//! error type for config loading.

pub mod config;
pub mod error;
pub mod ids;

pub use config::{Config, HlsConfig};
pub use error::{Error, Result};
pub use ids::StreamId;
