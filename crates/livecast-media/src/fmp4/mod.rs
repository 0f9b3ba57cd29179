//! Movie-fragment (moof) inspection.

mod keyframe;

pub use keyframe::{detect_moof_keyframe, KeyframeClass};
