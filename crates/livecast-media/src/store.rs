//! Segment and playlist storage.
//!
//! The segmenter addresses storage through [`SegmentStore`], keyed by the
//! numeric stream ID. The serving surface (HTTP, CDN push, ...) lives behind
//! this trait; the crate ships [`MemoryStore`] for tests and embedding, and
//! the CLI provides a directory-backed implementation.
//!
//! One writer per stream: the segmenter guarantees init-before-media and
//! segment `i` before `i+1`, and every segment write is followed by a
//! playlist write reflecting it.

use async_trait::async_trait;
use bytes::Bytes;
use livecast_core::StreamId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;

/// Blob store for one or more live streams.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Store the initialization segment, overwriting any prior init blob.
    async fn store_init_segment(&self, stream: StreamId, bytes: Bytes) -> Result<()>;

    /// Store a media segment under `name`. Idempotent by name.
    async fn store_segment(&self, stream: StreamId, name: &str, bytes: Bytes) -> Result<()>;

    /// Replace the stream's current playlist text.
    async fn update_playlist(&self, stream: StreamId, playlist: &str) -> Result<()>;
}

#[async_trait]
impl<S: SegmentStore + ?Sized> SegmentStore for Arc<S> {
    async fn store_init_segment(&self, stream: StreamId, bytes: Bytes) -> Result<()> {
        (**self).store_init_segment(stream, bytes).await
    }

    async fn store_segment(&self, stream: StreamId, name: &str, bytes: Bytes) -> Result<()> {
        (**self).store_segment(stream, name, bytes).await
    }

    async fn update_playlist(&self, stream: StreamId, playlist: &str) -> Result<()> {
        (**self).update_playlist(stream, playlist).await
    }
}

/// One write accepted by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    /// Init segment write.
    Init { stream: StreamId, bytes: Bytes },
    /// Media segment write.
    Segment {
        stream: StreamId,
        name: String,
        bytes: Bytes,
    },
    /// Playlist replacement.
    Playlist { stream: StreamId, text: String },
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    writes: Vec<StoreWrite>,
    init: HashMap<StreamId, Bytes>,
    segments: HashMap<(StreamId, String), Bytes>,
    playlists: HashMap<StreamId, String>,
}

/// In-memory store keeping blobs and an ordered log of every write.
///
/// The write log is what tests assert against: it captures ordering
/// guarantees (init before media, segment before playlist) that the final
/// blob maps cannot show.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes accepted so far, in order.
    pub fn writes(&self) -> Vec<StoreWrite> {
        self.inner.lock().writes.clone()
    }

    /// Current init segment for `stream`.
    pub fn init_segment(&self, stream: StreamId) -> Option<Bytes> {
        self.inner.lock().init.get(&stream).cloned()
    }

    /// Current bytes of the named media segment.
    pub fn segment(&self, stream: StreamId, name: &str) -> Option<Bytes> {
        self.inner
            .lock()
            .segments
            .get(&(stream, name.to_string()))
            .cloned()
    }

    /// Names of all media segments stored for `stream`, sorted.
    pub fn segment_names(&self, stream: StreamId) -> Vec<String> {
        let inner = self.inner.lock();
        let mut names: Vec<String> = inner
            .segments
            .keys()
            .filter(|(s, _)| *s == stream)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Current playlist text for `stream`.
    pub fn playlist(&self, stream: StreamId) -> Option<String> {
        self.inner.lock().playlists.get(&stream).cloned()
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn store_init_segment(&self, stream: StreamId, bytes: Bytes) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.writes.push(StoreWrite::Init {
            stream,
            bytes: bytes.clone(),
        });
        inner.init.insert(stream, bytes);
        Ok(())
    }

    async fn store_segment(&self, stream: StreamId, name: &str, bytes: Bytes) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.writes.push(StoreWrite::Segment {
            stream,
            name: name.to_string(),
            bytes: bytes.clone(),
        });
        inner.segments.insert((stream, name.to_string()), bytes);
        Ok(())
    }

    async fn update_playlist(&self, stream: StreamId, playlist: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.writes.push(StoreWrite::Playlist {
            stream,
            text: playlist.to_string(),
        });
        inner.playlists.insert(stream, playlist.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_writes_in_order() {
        let store = MemoryStore::new();
        let stream = StreamId::new(1);

        store
            .store_init_segment(stream, Bytes::from_static(b"init"))
            .await
            .unwrap();
        store
            .store_segment(stream, "segment0.m4s", Bytes::from_static(b"seg"))
            .await
            .unwrap();
        store.update_playlist(stream, "#EXTM3U\n").await.unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 3);
        assert!(matches!(writes[0], StoreWrite::Init { .. }));
        assert!(matches!(writes[1], StoreWrite::Segment { .. }));
        assert!(matches!(writes[2], StoreWrite::Playlist { .. }));
    }

    #[tokio::test]
    async fn overwrites_by_key() {
        let store = MemoryStore::new();
        let stream = StreamId::new(0);

        store
            .store_segment(stream, "segment0.m4s", Bytes::from_static(b"a"))
            .await
            .unwrap();
        store
            .store_segment(stream, "segment0.m4s", Bytes::from_static(b"b"))
            .await
            .unwrap();

        assert_eq!(
            store.segment(stream, "segment0.m4s"),
            Some(Bytes::from_static(b"b"))
        );
        assert_eq!(store.segment_names(stream), vec!["segment0.m4s"]);
    }

    #[tokio::test]
    async fn streams_are_partitioned() {
        let store = MemoryStore::new();

        store
            .store_segment(StreamId::new(1), "segment0.m4s", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(store.segment(StreamId::new(2), "segment0.m4s").is_none());
        assert!(store.segment_names(StreamId::new(2)).is_empty());
    }

    #[tokio::test]
    async fn arc_delegates() {
        let store = Arc::new(MemoryStore::new());
        let handle = store.clone();
        let stream = StreamId::new(9);

        handle
            .store_init_segment(stream, Bytes::from_static(b"init"))
            .await
            .unwrap();
        assert_eq!(store.init_segment(stream), Some(Bytes::from_static(b"init")));
    }
}
