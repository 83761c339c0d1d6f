use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Sink:   image header probe (PNG, JPEG, TIFF, TGA, BMP, GIF)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Frame sequence player
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Frame files, played in the given order
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Load playlist from JSON file (frames section is played)
    #[arg(short = 'p', long = "playlist", value_name = "PLAYLIST")]
    pub playlist: Option<PathBuf>,

    /// Glob pattern for frame files, sorted by path (e.g. "shot/*.png")
    #[arg(short = 'g', long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Frames per second (overrides playlist)
    #[arg(long = "fps", value_name = "N")]
    pub fps: Option<u32>,

    /// Enable looping (overrides playlist)
    #[arg(short = 'o', long = "loop", value_name = "0|1")]
    pub loop_playback: Option<u8>,

    /// Start frame number (0-based)
    #[arg(long = "frame", value_name = "N")]
    pub start_frame: Option<i32>,

    /// Origin of rendered frames
    #[arg(
        long = "origin",
        value_names = ["LEFT", "TOP"],
        num_args = 2,
        allow_negative_numbers = true
    )]
    pub origin: Option<Vec<i32>>,

    /// Stop looping playback after this many seconds
    #[arg(short = 'd', long = "duration", value_name = "SECS", default_value_t = 5.0)]
    pub duration: f64,

    /// Enable debug logging to file (default: reel.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
