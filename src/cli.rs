use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "livecast")]
#[command(author, version, about = "Live fMP4 capture to HLS repackager")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Repackage a captured fMP4 stream into an HLS directory
    Repackage {
        /// Input capture file (fragmented MP4)
        #[arg(required = true)]
        input: PathBuf,

        /// Output directory for init segment, media segments, and playlist
        #[arg(short, long, default_value = "./hls")]
        output: PathBuf,

        /// Target segment duration in seconds (overrides config)
        #[arg(long)]
        segment_duration: Option<f64>,

        /// Sliding playlist window size (overrides config)
        #[arg(long)]
        max_segments: Option<u32>,

        /// Numeric stream ID used to partition the output
        #[arg(long, default_value = "0")]
        stream_id: u64,

        /// First media segment index (continuation after a hot restart)
        #[arg(long, default_value = "0")]
        starting_index: u64,

        /// Mark the first emitted segment with a discontinuity
        #[arg(long)]
        discontinuity: bool,

        /// Tally keyframe cadence while repackaging
        #[arg(long)]
        keyframe_debug: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
