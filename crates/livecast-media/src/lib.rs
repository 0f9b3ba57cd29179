//! livecast-media: streaming fMP4 parsing and HLS live segmentation.
//!
//! This crate turns a live fragmented-MP4 byte stream (as produced by an
//! upstream browser capture) into HLS Version 7 output: one init segment,
//! numbered fMP4 media segments, and a rolling media playlist.
//!
//! # Modules
//!
//! - [`mp4`] - Streaming ISO BMFF box parser (chunk-tolerant, resyncing) and
//!   zero-copy child-box iteration
//! - [`fmp4`] - Movie-fragment inspection: keyframe classification from
//!   `traf`/`tfhd`/`trun` sample flags
//! - [`hls`] - Live media playlist rendering (M3U8)
//! - [`segmenter`] - The stateful fMP4-to-HLS segmenter
//! - [`store`] - Segment/playlist store trait plus an in-memory implementation
//! - [`source`] - Upstream byte-source event type
//! - [`clock`] - Monotonic clock abstraction for testable timing
//!
//! # Architecture
//!
//! Bytes flow one way: chunks are pushed into the [`mp4::BoxStreamParser`],
//! which emits complete top-level boxes in source order. The
//! [`segmenter::Segmenter`] consumes those boxes, assembles `ftyp`+`moov`
//! into the init segment, groups `moof`+`mdat` fragments into media segments
//! on a wall-clock policy, and rewrites the playlist after every segment
//! write. All state for one stream lives on one task; distinct streams are
//! fully independent.

pub mod clock;
pub mod error;
pub mod fmp4;
pub mod hls;
pub mod mp4;
pub mod segmenter;
pub mod source;
pub mod store;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{Error, Result};
pub use fmp4::{detect_moof_keyframe, KeyframeClass};
pub use hls::{segment_name, LiveEntry, LivePlaylist, INIT_SEGMENT_NAME};
pub use mp4::{BoxStreamParser, BoxType, ChildBox, ChildBoxes, Mp4Box};
pub use segmenter::{KeyframeStats, Segmenter, SegmenterConfig};
pub use source::SourceEvent;
pub use store::{MemoryStore, SegmentStore, StoreWrite};
