//! HLS playlist rendering (M3U8).

mod playlist;

pub use playlist::{segment_name, LiveEntry, LivePlaylist, INIT_SEGMENT_NAME};
