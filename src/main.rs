use reel::cli::Args;
use reel::paths::{self, PathConfig};
use reel::{FrameSequencer, PlayerConfig, ProbeSink, SequencerEvent};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossbeam_channel::{RecvTimeoutError, unbounded};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<()> {
    let log_level = args.log_level();

    if let Some(log_path_opt) = &args.log_file {
        // File logging with specified verbosity level
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| paths::data_file(paths::LOG_FILE, path_config));
        paths::ensure_parent_dirs(&[log_path.as_path()])?;
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = log_level.to_string().to_lowercase();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Expand a glob into a sorted frame list
fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in glob::glob(pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
        match entry {
            Ok(path) if path.is_file() => frames.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry: {}", e),
        }
    }
    frames.sort();
    Ok(frames)
}

/// Playlist first, then CLI overrides
fn build_config(args: &Args, path_config: &PathConfig) -> Result<PlayerConfig> {
    let mut config = match &args.playlist {
        Some(path) => PlayerConfig::load(path)?,
        None => {
            let default = paths::config_file(paths::PLAYLIST_FILE, path_config);
            if args.files.is_empty() && args.pattern.is_none() && default.is_file() {
                info!("Using default playlist: {}", default.display());
                PlayerConfig::load(&default)?
            } else {
                PlayerConfig::default()
            }
        }
    };

    let mut sources = args.files.clone();
    if let Some(pattern) = &args.pattern {
        sources.extend(expand_pattern(pattern)?);
    }
    if !sources.is_empty() {
        config.frames.sources = sources;
    }

    let frames = &mut config.frames;
    if let Some(fps) = args.fps {
        frames.fps = fps;
    }
    if let Some(flag) = args.loop_playback {
        frames.looping = flag != 0;
    }
    if let Some(origin) = &args.origin
        && let [left, top] = origin.as_slice()
    {
        frames.origin = reel::Origin::new(*left, *top);
    }

    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());

    init_logging(&args, &path_config)?;
    info!("Reel frame player starting...");
    debug!("Command-line args: {:?}", args);

    let config = build_config(&args, &path_config)?;
    if config.frames.sources.is_empty() {
        use clap::CommandFactory;
        let _ = Args::command().print_help();
        bail!("No frames to play (pass files, --pattern or --playlist)");
    }
    let looping = config.frames.looping;
    info!(
        "Playing {} frames at {} fps (loop={})",
        config.frames.sources.len(),
        config.frames.fps,
        looping
    );

    let sequencer = FrameSequencer::new(config.frames, ProbeSink::new());
    let (tx, rx) = unbounded();
    sequencer.subscribe(move |e: &SequencerEvent| {
        tx.send(e.clone()).ok();
    });

    if let Some(frame) = args.start_frame {
        sequencer.set_position(frame)?;
        // Paused playback resumes from the cursor instead of frame 0
        sequencer.pause();
    }
    sequencer.play();

    let event = if looping {
        let limit = Duration::from_secs_f64(args.duration.max(0.0));
        match rx.recv_timeout(limit) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                info!("Duration elapsed, stopping");
                sequencer.stop();
                rx.recv().context("Sequencer dropped its observers")?
            }
            Err(RecvTimeoutError::Disconnected) => bail!("Sequencer dropped its observers"),
        }
    } else {
        rx.recv().context("Sequencer dropped its observers")?
    };
    sequencer.wait_idle(Duration::from_secs(1));

    match event {
        SequencerEvent::Ended => {
            println!("Played {} frames", sequencer.cursor());
            Ok(())
        }
        SequencerEvent::Canceled => {
            println!("Stopped");
            Ok(())
        }
        SequencerEvent::Faulted(e) => bail!("Playback failed: {}", e),
    }
}
