//! Stateful fMP4-to-HLS live segmenter.
//!
//! One [`Segmenter`] owns the full state of one live stream: the streaming
//! box parser, the init-segment assembly, the fragment buffer for the
//! segment under construction, the sliding duration window, and the
//! discontinuity bookkeeping. Boxes flow in through [`push`](Segmenter::push)
//! (or the [`pipe`](Segmenter::pipe) event loop); init/media/playlist writes
//! flow out through the configured [`SegmentStore`].
//!
//! Segment cutting is wall-clock driven with one exception: the very first
//! segment is emitted as soon as a second fragment arrives, so a joining
//! player has something to decode as early as possible. Later segments wait
//! until the configured target duration has elapsed.

mod stats;

pub use stats::KeyframeStats;
use stats::KeyframeTracker;

use bytes::{Bytes, BytesMut};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tokio::sync::mpsc;

use livecast_core::{HlsConfig, StreamId};

use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::fmp4::detect_moof_keyframe;
use crate::hls::{segment_name, LiveEntry, LivePlaylist};
use crate::mp4::{BoxStreamParser, BoxType, Mp4Box};
use crate::source::SourceEvent;
use crate::store::SegmentStore;

/// Floor for a recorded segment duration in seconds. A segment flushed
/// immediately (fast first segment, discontinuity) still declares a playable
/// length.
const MIN_SEGMENT_DURATION_SECS: f64 = 0.1;

type StopCallback = Box<dyn FnOnce() + Send>;
type ErrorCallback = Box<dyn FnOnce(&Error) + Send>;

/// Per-stream segmenter settings.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Stream this segmenter writes under.
    pub stream_id: StreamId,
    /// Target media-segment duration in seconds.
    pub segment_duration: f64,
    /// Sliding playlist window size in segments.
    pub max_segments: u32,
    /// First media segment index (continuation counter after hot restart).
    pub starting_segment_index: u64,
    /// Force a discontinuity marker before the first emitted segment.
    pub pending_discontinuity: bool,
    /// Classify every moof and tally keyframe cadence.
    pub keyframe_debug: bool,
}

impl SegmenterConfig {
    /// Build per-stream settings from the application HLS config.
    pub fn new(stream_id: StreamId, hls: &HlsConfig) -> Self {
        Self {
            stream_id,
            segment_duration: hls.segment_duration,
            max_segments: hls.max_segments,
            starting_segment_index: 0,
            pending_discontinuity: false,
            keyframe_debug: false,
        }
    }
}

/// Live fMP4-to-HLS segmenter for one stream.
///
/// All methods take `&mut self`: one task owns the segmenter and processes
/// events in order. Once stopped (gracefully or by error) every further
/// input is dropped.
pub struct Segmenter<S, C = MonotonicClock> {
    cfg: SegmenterConfig,
    store: S,
    clock: C,
    parser: BoxStreamParser,

    segment_index: u64,
    fragment_buf: Vec<Bytes>,
    has_init: bool,
    init_boxes: Vec<Bytes>,
    first_segment_emitted: bool,
    segment_start: Duration,
    segment_durations: BTreeMap<u64, f64>,
    discontinuities: BTreeSet<u64>,
    pending_discontinuity: bool,
    stopped: bool,
    stats: KeyframeTracker,

    on_stop: Option<StopCallback>,
    on_error: Option<ErrorCallback>,
}

impl<S: SegmentStore, C: Clock> Segmenter<S, C> {
    /// Create a segmenter writing to `store`, timed by `clock`.
    pub fn new(cfg: SegmenterConfig, store: S, clock: C) -> Self {
        let segment_start = clock.now();
        Self {
            segment_index: cfg.starting_segment_index,
            pending_discontinuity: cfg.pending_discontinuity,
            cfg,
            store,
            clock,
            parser: BoxStreamParser::new(),
            fragment_buf: Vec::new(),
            has_init: false,
            init_boxes: Vec::new(),
            first_segment_emitted: false,
            segment_start,
            segment_durations: BTreeMap::new(),
            discontinuities: BTreeSet::new(),
            stopped: false,
            stats: KeyframeTracker::default(),
            on_stop: None,
            on_error: None,
        }
    }

    /// Register the graceful-end callback. Called at most once, and never
    /// after the error callback.
    pub fn on_stop(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_stop = Some(Box::new(callback));
    }

    /// Register the fatal-error callback. Called at most once, and never
    /// after the stop callback.
    pub fn on_error(&mut self, callback: impl FnOnce(&Error) + Send + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Consume events from an upstream source until it ends, fails, or
    /// detaches.
    ///
    /// Channel closure without a terminal event detaches the source and
    /// returns; a replacement receiver can be piped afterwards. Calling
    /// `pipe` again thus replaces the subscription.
    pub async fn pipe(&mut self, events: &mut mpsc::Receiver<SourceEvent>) {
        while !self.stopped {
            match events.recv().await {
                Some(SourceEvent::Data(chunk)) => {
                    if self.push(&chunk).await.is_err() {
                        break;
                    }
                }
                Some(SourceEvent::End) => {
                    self.finish().await;
                    break;
                }
                Some(SourceEvent::Error(msg)) => {
                    self.fail(Error::Upstream(msg));
                    break;
                }
                // Source went away without ending the stream.
                None => break,
            }
        }
    }

    /// Feed a chunk of the live byte stream.
    ///
    /// Complete boxes discovered in the stream are dispatched in order. A
    /// store failure is terminal: the error callback fires, the segmenter
    /// stops, and the error is returned.
    pub async fn push(&mut self, chunk: &[u8]) -> Result<()> {
        if self.stopped {
            return Ok(());
        }

        let mut boxes = Vec::new();
        self.parser.push(chunk, |b| {
            boxes.push(b);
            Ok(())
        })?;

        for mp4_box in boxes {
            if let Err(e) = self.handle_box(mp4_box).await {
                self.fail_terminal(&e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Graceful end of stream: flush the final partial segment, stop, and
    /// fire the stop callback.
    pub async fn finish(&mut self) {
        if self.stopped {
            return;
        }

        if !self.fragment_buf.is_empty() {
            if let Err(e) = self.output_segment().await {
                self.fail_terminal(&e);
                return;
            }
        }

        self.stopped = true;
        self.parser.flush();
        tracing::info!(
            stream = %self.cfg.stream_id,
            segments = self.segment_index - self.cfg.starting_segment_index,
            "stream ended"
        );
        if let Some(callback) = self.on_stop.take() {
            callback();
        }
    }

    /// Fatal upstream failure: stop immediately, dropping any partial
    /// segment, and fire the error callback.
    pub fn fail(&mut self, err: Error) {
        if self.stopped {
            return;
        }
        tracing::warn!(stream = %self.cfg.stream_id, error = %err, "stream failed");
        self.fail_terminal(&err);
    }

    /// Flush the current buffer as a short segment and mark the next one as
    /// discontinuous. No-op once stopped.
    pub async fn mark_discontinuity(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }

        if let Err(e) = self.output_segment().await {
            self.fail_terminal(&e);
            return Err(e);
        }
        self.pending_discontinuity = true;
        Ok(())
    }

    /// Detach and stop. Idempotent; fires no callbacks.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        tracing::debug!(stream = %self.cfg.stream_id, "segmenter stopped");
        self.stopped = true;
        self.parser.flush();
    }

    /// Next media segment index to be emitted.
    pub fn segment_index(&self) -> u64 {
        self.segment_index
    }

    /// Snapshot of the keyframe cadence counters.
    pub fn keyframe_stats(&self) -> KeyframeStats {
        self.stats.snapshot()
    }

    /// Whether the segmenter has terminated.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    async fn handle_box(&mut self, mp4_box: Mp4Box) -> Result<()> {
        if !self.has_init {
            match mp4_box.box_type {
                BoxType::FTYP | BoxType::MOOV => {
                    let completes_init = mp4_box.box_type == BoxType::MOOV;
                    self.init_boxes.push(mp4_box.data);
                    if completes_init {
                        let init = concat(&self.init_boxes);
                        tracing::info!(
                            stream = %self.cfg.stream_id,
                            bytes = init.len(),
                            "storing init segment"
                        );
                        self.store
                            .store_init_segment(self.cfg.stream_id, init)
                            .await?;
                        self.has_init = true;
                    }
                }
                // Media boxes before initialization cannot be played; drop.
                other => {
                    tracing::trace!(box_type = %other, "dropping pre-init box");
                }
            }
            return Ok(());
        }

        match mp4_box.box_type {
            // Mid-stream re-initialization is not supported; the original
            // init mapping stays authoritative.
            BoxType::FTYP | BoxType::MOOV => {
                tracing::debug!(box_type = %mp4_box.box_type, "ignoring late init box");
            }
            BoxType::MOOF => {
                if !self.fragment_buf.is_empty() {
                    let elapsed = self.clock.now().saturating_sub(self.segment_start);
                    let target = Duration::from_secs_f64(self.cfg.segment_duration.max(0.0));
                    if !self.first_segment_emitted || elapsed >= target {
                        self.output_segment().await?;
                    }
                }
                if self.cfg.keyframe_debug {
                    let class = detect_moof_keyframe(&mp4_box.data);
                    self.stats.record(class, self.clock.now());
                }
                self.push_fragment(mp4_box.data);
            }
            // mdat plus pass-through boxes (styp, sidx, ...) travel with the
            // segment under construction.
            _ => self.push_fragment(mp4_box.data),
        }
        Ok(())
    }

    /// Emit the segment under construction, then rewrite the playlist.
    async fn output_segment(&mut self) -> Result<()> {
        if self.fragment_buf.is_empty() {
            return Ok(());
        }

        if self.pending_discontinuity {
            self.discontinuities.insert(self.segment_index);
            self.pending_discontinuity = false;
        }

        let now = self.clock.now();
        let duration = now
            .saturating_sub(self.segment_start)
            .as_secs_f64()
            .max(MIN_SEGMENT_DURATION_SECS);
        self.segment_durations.insert(self.segment_index, duration);

        let name = segment_name(self.segment_index);
        let data = concat(&self.fragment_buf);
        tracing::debug!(
            stream = %self.cfg.stream_id,
            segment = %name,
            bytes = data.len(),
            duration,
            "storing media segment"
        );
        self.store
            .store_segment(self.cfg.stream_id, &name, data)
            .await?;

        self.segment_index += 1;
        self.first_segment_emitted = true;

        let window_start = self.segment_index.saturating_sub(self.cfg.max_segments as u64);
        self.segment_durations.retain(|&i, _| i >= window_start);

        self.fragment_buf.clear();
        self.stats.begin_segment();
        self.segment_start = now;

        let playlist = self.build_playlist().render();
        self.store
            .update_playlist(self.cfg.stream_id, &playlist)
            .await?;
        Ok(())
    }

    fn build_playlist(&self) -> LivePlaylist {
        let window_start = self.segment_index.saturating_sub(self.cfg.max_segments as u64);

        // TARGETDURATION may never under-declare: floor at the configured
        // duration, which is also the fallback for unrecorded entries.
        let mut max_duration = self.cfg.segment_duration;
        let mut entries = Vec::with_capacity((self.segment_index - window_start) as usize);
        for index in window_start..self.segment_index {
            let duration = self
                .segment_durations
                .get(&index)
                .copied()
                .unwrap_or(self.cfg.segment_duration);
            if duration > max_duration {
                max_duration = duration;
            }
            entries.push(LiveEntry {
                index,
                duration,
                discontinuity: self.discontinuities.contains(&index),
            });
        }

        LivePlaylist {
            target_duration: max_duration.ceil() as u64,
            media_sequence: window_start,
            entries,
        }
    }

    fn push_fragment(&mut self, data: Bytes) {
        self.fragment_buf.push(data);
    }

    /// Terminal failure path: stop, drop the parser tail, fire `on_error`.
    fn fail_terminal(&mut self, err: &Error) {
        self.stopped = true;
        self.parser.flush();
        // The stop callback is forfeited; the two are mutually exclusive.
        self.on_stop = None;
        if let Some(callback) = self.on_error.take() {
            callback(err);
        }
    }
}

fn concat(parts: &[Bytes]) -> Bytes {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = BytesMut::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out.freeze()
}
