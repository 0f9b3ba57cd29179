//! Streaming, resyncing top-level box parser.
//!
//! The live capture delivers bytes in arbitrary chunks with no alignment
//! guarantees, and the stream can carry corrupt headers after a tab crash or
//! a mid-write reconnect. The parser therefore never fails on malformed
//! input: any header it cannot trust costs exactly one byte of input and the
//! scan restarts, so a valid box following garbage is always found.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::Result;
use crate::mp4::{BoxType, Mp4Box};

/// Boxes claiming more than this are treated as malformed headers rather
/// than buffered; a live fragment never approaches this size, while garbage
/// read as a size field routinely does.
const MAX_BOX_SIZE: usize = 64 * 1024 * 1024;

/// Incremental parser that turns an unframed byte stream into complete
/// top-level MP4 boxes.
///
/// Feed chunks with [`push`](Self::push); each complete box is handed to the
/// callback in source order as an independently-owned [`Mp4Box`]. Incomplete
/// trailing bytes stay buffered until the next push, or are discarded by
/// [`flush`](Self::flush).
#[derive(Debug, Default)]
pub struct BoxStreamParser {
    buf: BytesMut,
}

impl BoxStreamParser {
    /// Create an empty parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of buffered bytes not yet emitted as a box.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Append a chunk and emit every complete box discovered.
    ///
    /// A callback error aborts the scan immediately and is returned to the
    /// caller; the box that triggered it is considered consumed.
    pub fn push<F>(&mut self, chunk: &[u8], mut on_box: F) -> Result<()>
    where
        F: FnMut(Mp4Box) -> Result<()>,
    {
        self.buf.extend_from_slice(chunk);

        while self.buf.len() >= 8 {
            let size_field = read_u32(&self.buf, 0);

            let (box_size, header_len) = match size_field {
                0 => {
                    // "To end of file" cannot be honored on a live stream.
                    self.resync();
                    continue;
                }
                1 => {
                    if self.buf.len() < 16 {
                        // Extended size not yet buffered.
                        return Ok(());
                    }
                    let extended = read_u64(&self.buf, 8);
                    if extended >> 32 != 0 {
                        // A fabricated > 4 GiB box.
                        tracing::trace!(size = extended, "resync: unrealistic extended box size");
                        self.resync();
                        continue;
                    }
                    (extended as usize, 16usize)
                }
                n => (n as usize, 8usize),
            };

            if box_size < header_len || box_size > MAX_BOX_SIZE {
                self.resync();
                continue;
            }

            if self.buf.len() < box_size {
                // Await more input.
                return Ok(());
            }

            let data: Bytes = self.buf.split_to(box_size).freeze();
            let box_type = BoxType([data[4], data[5], data[6], data[7]]);
            on_box(Mp4Box { box_type, data })?;
        }

        Ok(())
    }

    /// Discard any buffered tail (an incomplete box).
    pub fn flush(&mut self) {
        self.buf.clear();
    }

    /// Skip one byte and let the scan restart at the next offset.
    fn resync(&mut self) {
        self.buf.advance(1);
    }
}

fn read_u32(buf: &BytesMut, offset: usize) -> u32 {
    u32::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn read_u64(buf: &BytesMut, offset: usize) -> u64 {
    u64::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ])
}
