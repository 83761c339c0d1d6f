//! Playback configuration.
//!
//! Hosts own these structs and hand copies to the controls; a control never
//! mutates its configuration. Changes are pushed back in with `set_config`.
//! Whole configurations persist as JSON playlists.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sink::Origin;

/// Default frame rate for frame sequences
pub const DEFAULT_FPS: u32 = 25;

/// Frame sequencer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Ordered frame paths. Existence is checked per tick, not here.
    pub sources: Vec<PathBuf>,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub fps: u32,
    pub origin: Origin,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            looping: false,
            fps: DEFAULT_FPS,
            origin: Origin::default(),
        }
    }
}

impl SequencerConfig {
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Tick interval: `1000 / fps` whole milliseconds (truncating).
    /// None when `fps` is zero.
    pub fn frame_interval(&self) -> Option<Duration> {
        if self.fps == 0 {
            return None;
        }
        Some(Duration::from_millis(u64::from(1000 / self.fps)))
    }
}

/// Transport values forwarded to the external media engine as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportParams {
    /// Start position in milliseconds
    pub position_ms: u64,
    pub volume: f64,
    pub speed_ratio: f64,
}

impl Default for TransportParams {
    fn default() -> Self {
        Self {
            position_ms: 0,
            volume: 0.5,
            speed_ratio: 1.0,
        }
    }
}

/// Stream controller configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub sources: Vec<PathBuf>,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub origin: Origin,
    pub transport: TransportParams,
}

impl StreamConfig {
    pub fn new<I, P>(sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

/// Playlist file: both controls' configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub frames: SequencerConfig,
    pub video: StreamConfig,
}

impl PlayerConfig {
    /// Load playlist JSON. Relative source paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read playlist: {}", path.display()))?;
        let mut config: PlayerConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse playlist: {}", path.display()))?;

        if let Some(base) = path.parent() {
            resolve_relative(&mut config.frames.sources, base);
            resolve_relative(&mut config.video.sources, base);
        }

        debug!(
            "Loaded playlist {}: {} frames, {} videos",
            path.display(),
            config.frames.sources.len(),
            config.video.sources.len()
        );
        Ok(config)
    }
}

fn resolve_relative(sources: &mut [PathBuf], base: &Path) {
    for src in sources.iter_mut() {
        if src.is_relative() {
            *src = base.join(&*src);
        }
    }
}
