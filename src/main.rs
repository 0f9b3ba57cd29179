mod cli;
mod fs_store;

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use cli::{Cli, Commands};
use fs_store::FsStore;
use livecast_core::{Config, StreamId};
use livecast_media::{MonotonicClock, Segmenter, SegmenterConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "livecast=debug,livecast_media=trace,livecast_core=debug".to_string()
        } else {
            "livecast=info,livecast_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Repackage {
            input,
            output,
            segment_duration,
            max_segments,
            stream_id,
            starting_index,
            discontinuity,
            keyframe_debug,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(repackage(RepackageArgs {
                input,
                output,
                config_path: cli.config,
                segment_duration,
                max_segments,
                stream_id,
                starting_index,
                discontinuity,
                keyframe_debug,
            }))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("livecast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct RepackageArgs {
    input: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    segment_duration: Option<f64>,
    max_segments: Option<u32>,
    stream_id: u64,
    starting_index: u64,
    discontinuity: bool,
    keyframe_debug: bool,
}

async fn repackage(args: RepackageArgs) -> Result<()> {
    use tokio::io::AsyncReadExt;

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", args.input);
    }

    let mut config = Config::load_or_default(args.config_path.as_deref());
    if let Some(duration) = args.segment_duration {
        config.hls.segment_duration = duration;
    }
    if let Some(window) = args.max_segments {
        config.hls.max_segments = window;
    }
    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }

    let stream = StreamId::new(args.stream_id);
    let mut seg_cfg = SegmenterConfig::new(stream, &config.hls);
    seg_cfg.starting_segment_index = args.starting_index;
    seg_cfg.pending_discontinuity = args.discontinuity;
    seg_cfg.keyframe_debug = args.keyframe_debug;

    let store = FsStore::new(&args.output);
    let stream_dir = store.stream_dir(stream);
    let mut segmenter = Segmenter::new(seg_cfg, store, MonotonicClock::new());
    segmenter.on_error(|e| tracing::error!("stream failed: {e}"));

    tracing::info!(
        input = %args.input.display(),
        output = %stream_dir.display(),
        "repackaging capture"
    );

    let mut file = tokio::fs::File::open(&args.input).await?;
    let mut chunk = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        segmenter.push(&chunk[..n]).await?;
    }
    segmenter.finish().await;

    let segments = segmenter.segment_index() - args.starting_index;
    println!("Wrote {} segment(s) to {}", segments, stream_dir.display());

    if args.keyframe_debug {
        let stats = segmenter.keyframe_stats();
        println!(
            "Keyframes: {} keyframe, {} non-keyframe, {} indeterminate",
            stats.keyframe_count, stats.non_keyframe_count, stats.indeterminate_count
        );
        println!(
            "Keyframe interval ms: min {}, max {}, avg {:.1}",
            stats.min_keyframe_interval_ms,
            stats.max_keyframe_interval_ms,
            stats.average_keyframe_interval_ms
        );
        println!(
            "Segments without leading keyframe: {}",
            stats.segments_without_leading_keyframe
        );
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        println!("No config file specified; defaults are valid.");
        return Ok(());
    };

    let contents = std::fs::read_to_string(path)?;
    let config = Config::from_json(&contents)?;

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Config OK: {}", path.display());
    } else {
        println!("Config parsed with {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}
