//! Zero-copy iteration over a container box's immediate children.
//!
//! Unlike the streaming parser, which resyncs past malformed headers, child
//! iteration stops at the first header it cannot trust: inside an
//! already-delimited parent there is no later framing to recover to, and a
//! truncated child means the rest of the parent is unusable.

use crate::mp4::BoxType;

/// One child box located inside a parent's bytes.
///
/// Carries offsets rather than owned bytes; [`data`](Self::data) and
/// [`payload`](Self::payload) alias the parent slice.
#[derive(Debug, Clone, Copy)]
pub struct ChildBox<'a> {
    /// Child box type code.
    pub box_type: BoxType,
    /// Offset of the child's first header byte within the parent.
    pub offset: usize,
    /// Total child size in bytes (header included).
    pub size: usize,
    header_len: usize,
    parent: &'a [u8],
}

impl<'a> ChildBox<'a> {
    /// Full child bytes, header included.
    pub fn data(&self) -> &'a [u8] {
        &self.parent[self.offset..self.offset + self.size]
    }

    /// Child payload (bytes after the 8- or 16-byte header).
    pub fn payload(&self) -> &'a [u8] {
        &self.parent[self.offset + self.header_len..self.offset + self.size]
    }
}

/// Iterator over the immediate children of a container box.
///
/// `parent` must be the container's full bytes; children start after its
/// 8-byte header.
#[derive(Debug, Clone)]
pub struct ChildBoxes<'a> {
    parent: &'a [u8],
    pos: usize,
}

impl<'a> ChildBoxes<'a> {
    /// Walk the children of `parent`.
    pub fn new(parent: &'a [u8]) -> Self {
        Self { parent, pos: 8 }
    }
}

impl<'a> Iterator for ChildBoxes<'a> {
    type Item = ChildBox<'a>;

    fn next(&mut self) -> Option<ChildBox<'a>> {
        let remaining = self.parent.len().checked_sub(self.pos)?;
        if remaining < 8 {
            return None;
        }

        let at = self.pos;
        let size_field = u32::from_be_bytes([
            self.parent[at],
            self.parent[at + 1],
            self.parent[at + 2],
            self.parent[at + 3],
        ]);

        let (size, header_len) = match size_field {
            0 => return None,
            1 => {
                if remaining < 16 {
                    return None;
                }
                let extended = u64::from_be_bytes([
                    self.parent[at + 8],
                    self.parent[at + 9],
                    self.parent[at + 10],
                    self.parent[at + 11],
                    self.parent[at + 12],
                    self.parent[at + 13],
                    self.parent[at + 14],
                    self.parent[at + 15],
                ]);
                if extended >> 32 != 0 {
                    return None;
                }
                (extended as usize, 16usize)
            }
            n if n < 8 => return None,
            n => (n as usize, 8usize),
        };

        if size < header_len || size > remaining {
            return None;
        }

        self.pos = at + size;
        Some(ChildBox {
            box_type: BoxType([
                self.parent[at + 4],
                self.parent[at + 5],
                self.parent[at + 6],
                self.parent[at + 7],
            ]),
            offset: at,
            size,
            header_len,
            parent: self.parent,
        })
    }
}
