//! Directory-backed segment store for the CLI.
//!
//! Lays each stream out as `<root>/stream<id>/` containing `init.mp4`, the
//! numbered `segment<i>.m4s` files, and `playlist.m3u8`. Any HTTP file
//! server pointed at the stream directory can then serve the HLS output
//! directly.

use async_trait::async_trait;
use bytes::Bytes;
use livecast_core::StreamId;
use livecast_media::{Result, SegmentStore, INIT_SEGMENT_NAME};
use std::path::PathBuf;

/// Name of the playlist file inside a stream directory.
const PLAYLIST_NAME: &str = "playlist.m3u8";

/// Filesystem-backed [`SegmentStore`].
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`. Directories are created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one stream's files.
    pub fn stream_dir(&self, stream: StreamId) -> PathBuf {
        self.root.join(format!("stream{stream}"))
    }

    async fn write_blob(&self, stream: StreamId, name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.stream_dir(stream);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(name), bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl SegmentStore for FsStore {
    async fn store_init_segment(&self, stream: StreamId, bytes: Bytes) -> Result<()> {
        self.write_blob(stream, INIT_SEGMENT_NAME, &bytes).await
    }

    async fn store_segment(&self, stream: StreamId, name: &str, bytes: Bytes) -> Result<()> {
        self.write_blob(stream, name, &bytes).await
    }

    async fn update_playlist(&self, stream: StreamId, playlist: &str) -> Result<()> {
        self.write_blob(stream, PLAYLIST_NAME, playlist.as_bytes())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_stream_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let stream = StreamId::new(3);

        store
            .store_init_segment(stream, Bytes::from_static(b"init-bytes"))
            .await
            .unwrap();
        store
            .store_segment(stream, "segment0.m4s", Bytes::from_static(b"segment-bytes"))
            .await
            .unwrap();
        store.update_playlist(stream, "#EXTM3U\n").await.unwrap();

        let base = dir.path().join("stream3");
        assert_eq!(std::fs::read(base.join("init.mp4")).unwrap(), b"init-bytes");
        assert_eq!(
            std::fs::read(base.join("segment0.m4s")).unwrap(),
            b"segment-bytes"
        );
        assert_eq!(
            std::fs::read_to_string(base.join("playlist.m3u8")).unwrap(),
            "#EXTM3U\n"
        );
    }

    #[tokio::test]
    async fn playlist_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let stream = StreamId::new(0);

        store.update_playlist(stream, "first\n").await.unwrap();
        store.update_playlist(stream, "second\n").await.unwrap();

        let text =
            std::fs::read_to_string(dir.path().join("stream0").join("playlist.m3u8")).unwrap();
        assert_eq!(text, "second\n");
    }
}
