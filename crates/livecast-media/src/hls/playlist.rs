//! Live HLS media playlist rendering.
//!
//! Renders the rolling playlist for one live stream: protocol version 7,
//! fMP4 segments, a sliding window of entries, and no `EXT-X-ENDLIST` (the
//! stream is live until it stops being served). Output is UTF-8 with LF
//! terminators and a trailing newline.

use std::fmt::Write;

/// Well-known name of the initialization segment blob.
pub const INIT_SEGMENT_NAME: &str = "init.mp4";

/// Blob name for the media segment at `index`.
pub fn segment_name(index: u64) -> String {
    format!("segment{index}.m4s")
}

/// One media-segment entry in the live playlist window.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveEntry {
    /// Monotonic segment index (names the segment file).
    pub index: u64,
    /// Observed duration in seconds.
    pub duration: f64,
    /// Whether a discontinuity precedes this segment.
    pub discontinuity: bool,
}

/// Rolling media playlist for one live stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LivePlaylist {
    /// Declared TARGETDURATION in whole seconds (never under the longest
    /// entry in the window).
    pub target_duration: u64,
    /// Index of the first entry in the window (EXT-X-MEDIA-SEQUENCE).
    pub media_sequence: u64,
    /// Window entries, oldest first.
    pub entries: Vec<LiveEntry>,
}

impl LivePlaylist {
    /// Render to an M3U8 string.
    ///
    /// After a discontinuity the init segment is re-announced so clients
    /// reinitialize their decoders before the next segment.
    pub fn render(&self) -> String {
        let mut out = String::new();

        writeln!(out, "#EXTM3U").unwrap();
        writeln!(out, "#EXT-X-VERSION:7").unwrap();
        writeln!(out, "#EXT-X-TARGETDURATION:{}", self.target_duration).unwrap();
        writeln!(out, "#EXT-X-MEDIA-SEQUENCE:{}", self.media_sequence).unwrap();
        writeln!(out, "#EXT-X-MAP:URI=\"{INIT_SEGMENT_NAME}\"").unwrap();

        for entry in &self.entries {
            if entry.discontinuity {
                writeln!(out, "#EXT-X-DISCONTINUITY").unwrap();
                writeln!(out, "#EXT-X-MAP:URI=\"{INIT_SEGMENT_NAME}\"").unwrap();
            }
            writeln!(out, "#EXTINF:{:.3},", entry.duration).unwrap();
            writeln!(out, "{}", segment_name(entry.index)).unwrap();
        }

        out
    }
}
