//! Upstream byte-source events.
//!
//! The capture producer is opaque to this crate: it is anything that can
//! deliver data chunks and eventually either end cleanly or fail. Events
//! arrive over a `tokio::sync::mpsc` channel; closing the channel without a
//! terminal event detaches the segmenter without ending the stream, so a
//! replacement source can be piped in.

use bytes::Bytes;

/// Event emitted by an upstream capture source.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A chunk of the live MP4 byte stream.
    Data(Bytes),
    /// Graceful end of the stream.
    End,
    /// Fatal upstream failure with a description.
    Error(String),
}
