//! Keyframe cadence statistics.
//!
//! When keyframe debugging is enabled the segmenter classifies every moof it
//! sees and feeds the verdict into a [`KeyframeTracker`]. The resulting
//! [`KeyframeStats`] snapshot answers the operational questions: how often
//! do keyframes arrive, and how many segments start without one.

use std::time::Duration;

use crate::fmp4::KeyframeClass;

/// Snapshot of keyframe cadence counters.
///
/// Interval figures are reported as 0 until at least two keyframes have
/// been observed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyframeStats {
    /// Fragments classified as starting on a sync sample.
    pub keyframe_count: u64,
    /// Fragments classified as starting on a dependent sample.
    pub non_keyframe_count: u64,
    /// Fragments whose flags could not be resolved.
    pub indeterminate_count: u64,
    /// Shortest observed gap between consecutive keyframes, in ms.
    pub min_keyframe_interval_ms: u64,
    /// Longest observed gap between consecutive keyframes, in ms.
    pub max_keyframe_interval_ms: u64,
    /// Mean gap between consecutive keyframes, in ms.
    pub average_keyframe_interval_ms: f64,
    /// Segments whose first fragment was not a confirmed keyframe.
    pub segments_without_leading_keyframe: u64,
}

/// Mutable tally behind [`KeyframeStats`].
#[derive(Debug, Default)]
pub(crate) struct KeyframeTracker {
    keyframes: u64,
    non_keyframes: u64,
    indeterminate: u64,
    last_keyframe_at: Option<Duration>,
    min_interval: Duration,
    max_interval: Duration,
    total_interval: Duration,
    segments_without_leading_keyframe: u64,
    segment_first_moof_checked: bool,
}

impl KeyframeTracker {
    /// Record one classified moof observed at monotonic time `now`.
    pub(crate) fn record(&mut self, class: KeyframeClass, now: Duration) {
        match class {
            KeyframeClass::Keyframe => {
                self.keyframes += 1;
                if let Some(last) = self.last_keyframe_at {
                    let interval = now.saturating_sub(last);
                    if self.min_interval == Duration::ZERO || interval < self.min_interval {
                        self.min_interval = interval;
                    }
                    if interval > self.max_interval {
                        self.max_interval = interval;
                    }
                    self.total_interval += interval;
                }
                self.last_keyframe_at = Some(now);
            }
            KeyframeClass::NonKeyframe => self.non_keyframes += 1,
            KeyframeClass::Indeterminate => self.indeterminate += 1,
        }

        if !self.segment_first_moof_checked {
            self.segment_first_moof_checked = true;
            if class != KeyframeClass::Keyframe {
                self.segments_without_leading_keyframe += 1;
            }
        }
    }

    /// Reset the per-segment leading-keyframe check.
    pub(crate) fn begin_segment(&mut self) {
        self.segment_first_moof_checked = false;
    }

    /// Current counters as a snapshot.
    pub(crate) fn snapshot(&self) -> KeyframeStats {
        let (min_ms, max_ms, avg_ms) = if self.keyframes >= 2 {
            (
                self.min_interval.as_millis() as u64,
                self.max_interval.as_millis() as u64,
                self.total_interval.as_millis() as f64 / (self.keyframes - 1) as f64,
            )
        } else {
            (0, 0, 0.0)
        };

        KeyframeStats {
            keyframe_count: self.keyframes,
            non_keyframe_count: self.non_keyframes,
            indeterminate_count: self.indeterminate,
            min_keyframe_interval_ms: min_ms,
            max_keyframe_interval_ms: max_ms,
            average_keyframe_interval_ms: avg_ms,
            segments_without_leading_keyframe: self.segments_without_leading_keyframe,
        }
    }
}
