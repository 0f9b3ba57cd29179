//! MP4 (ISO BMFF) box types and streaming parse utilities.
//!
//! Boxes are the length-prefixed records of ISO/IEC 14496-12: a 32-bit
//! big-endian size, a 4-character type tag, then the payload. A size field
//! of 1 means a 64-bit extended size follows the tag; 0 means "to end of
//! file" and is invalid on a live stream.

mod children;
mod stream_parser;

pub use children::{ChildBox, ChildBoxes};
pub use stream_parser::BoxStreamParser;

use bytes::Bytes;

/// Four-character box type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxType(pub [u8; 4]);

impl BoxType {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const MOOV: Self = Self(*b"moov");
    pub const MOOF: Self = Self(*b"moof");
    pub const MDAT: Self = Self(*b"mdat");
    pub const STYP: Self = Self(*b"styp");
    pub const SIDX: Self = Self(*b"sidx");
    pub const TRAF: Self = Self(*b"traf");
    pub const TFHD: Self = Self(*b"tfhd");
    pub const TRUN: Self = Self(*b"trun");
    pub const FREE: Self = Self(*b"free");

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl std::fmt::Display for BoxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete top-level box emitted by the streaming parser.
///
/// `data` covers the full box (header plus payload) and owns its memory
/// independently of the parser's internal buffer, so it may be held for as
/// long as the segmenter needs it.
#[derive(Debug, Clone)]
pub struct Mp4Box {
    /// Box type code.
    pub box_type: BoxType,
    /// Full box bytes, header included.
    pub data: Bytes,
}

impl Mp4Box {
    /// Total box size in bytes (header included).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Header length: 16 for extended-size boxes, 8 otherwise.
    pub fn header_len(&self) -> usize {
        if self.data.len() >= 4 {
            let size_field = u32::from_be_bytes([
                self.data[0],
                self.data[1],
                self.data[2],
                self.data[3],
            ]);
            if size_field == 1 {
                return 16;
            }
        }
        8
    }

    /// Box payload (bytes after the header).
    pub fn payload(&self) -> &[u8] {
        let header = self.header_len().min(self.data.len());
        &self.data[header..]
    }
}
