//! Keyframe classification from ISO/IEC 14496-12 sample flags.
//!
//! A fragment that starts on a sync sample lets a late-joining HLS client
//! begin decoding at that segment; one that does not costs the client a
//! wait for the next IDR. Capture pipelines drift, so the segmenter can be
//! asked to tally this per fragment.
//!
//! Classification looks at each `traf` of the `moof` and resolves the first
//! sample's flags word from, in priority order: the trun's
//! `first_sample_flags` field, the first per-sample `sample_flags` entry,
//! or the tfhd's `default_sample_flags`. Anything out of bounds or absent
//! resolves to nothing rather than an error.

use crate::mp4::{BoxType, ChildBoxes};

// tfhd optional-field flag bits.
const TFHD_BASE_DATA_OFFSET: u32 = 0x00_0001;
const TFHD_SAMPLE_DESCRIPTION_INDEX: u32 = 0x00_0002;
const TFHD_DEFAULT_SAMPLE_DURATION: u32 = 0x00_0008;
const TFHD_DEFAULT_SAMPLE_SIZE: u32 = 0x00_0010;
const TFHD_DEFAULT_SAMPLE_FLAGS: u32 = 0x00_0020;

// trun optional-field flag bits.
const TRUN_DATA_OFFSET: u32 = 0x00_0001;
const TRUN_FIRST_SAMPLE_FLAGS: u32 = 0x00_0004;
const TRUN_SAMPLE_DURATION: u32 = 0x00_0100;
const TRUN_SAMPLE_SIZE: u32 = 0x00_0200;
const TRUN_SAMPLE_FLAGS: u32 = 0x00_0400;

/// Classification of a movie fragment's leading sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyframeClass {
    /// The fragment starts on a sync sample.
    Keyframe,
    /// The fragment starts on a dependent (non-sync) sample.
    NonKeyframe,
    /// No track fragment carried resolvable sample flags.
    Indeterminate,
}

/// Classify whether a `moof` box begins on a sync sample.
///
/// `moof` must be the full box bytes, header included. Audio tracks are
/// always sync, so an explicit non-keyframe verdict can only come from a
/// video track and wins over any keyframe verdict from other tracks.
pub fn detect_moof_keyframe(moof: &[u8]) -> KeyframeClass {
    let mut saw_keyframe = false;
    let mut saw_non_keyframe = false;

    for traf in ChildBoxes::new(moof).filter(|c| c.box_type == BoxType::TRAF) {
        let mut default_sample_flags: Option<u32> = None;

        for child in ChildBoxes::new(traf.data()) {
            match child.box_type {
                BoxType::TFHD => {
                    default_sample_flags = tfhd_default_sample_flags(child.payload());
                }
                BoxType::TRUN => {
                    if let Some(flags) =
                        trun_first_sample_flags(child.payload(), default_sample_flags)
                    {
                        if is_sync_sample(flags) {
                            saw_keyframe = true;
                        } else {
                            saw_non_keyframe = true;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    if saw_non_keyframe {
        KeyframeClass::NonKeyframe
    } else if saw_keyframe {
        KeyframeClass::Keyframe
    } else {
        KeyframeClass::Indeterminate
    }
}

/// Extract `default_sample_flags` from a tfhd payload (after the box
/// header), if the flag bit is set and the field is in bounds.
fn tfhd_default_sample_flags(payload: &[u8]) -> Option<u32> {
    let flags = read_u32(payload, 0)? & 0x00FF_FFFF;
    if flags & TFHD_DEFAULT_SAMPLE_FLAGS == 0 {
        return None;
    }

    // version/flags (4) + track_ID (4), then optional fields in tfhd order.
    let mut offset = 8usize;
    if flags & TFHD_BASE_DATA_OFFSET != 0 {
        offset += 8;
    }
    if flags & TFHD_SAMPLE_DESCRIPTION_INDEX != 0 {
        offset += 4;
    }
    if flags & TFHD_DEFAULT_SAMPLE_DURATION != 0 {
        offset += 4;
    }
    if flags & TFHD_DEFAULT_SAMPLE_SIZE != 0 {
        offset += 4;
    }
    read_u32(payload, offset)
}

/// Resolve the flags word governing a trun's first sample.
fn trun_first_sample_flags(payload: &[u8], default_sample_flags: Option<u32>) -> Option<u32> {
    let flags = read_u32(payload, 0)? & 0x00FF_FFFF;
    let sample_count = read_u32(payload, 4)?;
    if sample_count == 0 {
        return None;
    }

    // version/flags (4) + sample_count (4), then optional header fields.
    let mut offset = 8usize;
    if flags & TRUN_DATA_OFFSET != 0 {
        offset += 4;
    }
    if flags & TRUN_FIRST_SAMPLE_FLAGS != 0 {
        return read_u32(payload, offset);
    }
    if flags & TRUN_SAMPLE_FLAGS != 0 {
        if flags & TRUN_SAMPLE_DURATION != 0 {
            offset += 4;
        }
        if flags & TRUN_SAMPLE_SIZE != 0 {
            offset += 4;
        }
        return read_u32(payload, offset);
    }
    default_sample_flags
}

/// Evaluate a 32-bit sample flags word per the ISO dependency rules.
fn is_sync_sample(flags: u32) -> bool {
    let sample_depends_on = (flags >> 24) & 0x3;
    let sample_is_non_sync = (flags >> 16) & 0x1;
    match sample_depends_on {
        1 => false,
        2 => true,
        _ => sample_is_non_sync == 0,
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    if end > data.len() {
        return None;
    }
    Some(u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]))
}
