//! Playback error taxonomy shared by the frame sequencer and stream controller.

use std::path::PathBuf;

/// Errors raised by playback controls and runs.
///
/// `InvalidPosition` is returned synchronously to the caller. Everything else
/// happens inside a run (or an engine callback) and reaches the host only
/// through a terminal event.
#[derive(Debug)]
pub enum PlaybackError {
    /// `set_position` index outside `[0, len]`
    InvalidPosition { index: i32, len: usize },
    /// Resolved source path does not exist on disk
    MissingSource(PathBuf),
    /// Run stopped by Pause/Stop or a dropped handle
    Canceled,
    /// Render sink failed to load or draw a frame
    Render { path: PathBuf, source: anyhow::Error },
    /// Failure reported by the external media engine
    UpstreamEngine(String),
    /// Frame rate must be positive
    InvalidFrameRate(u32),
    /// Run thread could not be started
    Spawn(std::io::Error),
}

impl PlaybackError {
    /// True for the expected, non-fault termination.
    pub fn is_canceled(&self) -> bool {
        matches!(self, PlaybackError::Canceled)
    }
}

impl std::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackError::InvalidPosition { index, len } => {
                write!(f, "Position {} out of range [0, {}]", index, len)
            }
            PlaybackError::MissingSource(path) => {
                write!(f, "Source {} does not exist", path.display())
            }
            PlaybackError::Canceled => write!(f, "Playback canceled"),
            PlaybackError::Render { path, source } => {
                write!(f, "Failed to render {}: {:#}", path.display(), source)
            }
            PlaybackError::UpstreamEngine(msg) => write!(f, "Media engine error: {}", msg),
            PlaybackError::InvalidFrameRate(fps) => {
                write!(f, "Invalid frame rate {} (must be > 0)", fps)
            }
            PlaybackError::Spawn(e) => write!(f, "Failed to start playback thread: {}", e),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::Render { source, .. } => Some(&**source),
            PlaybackError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}
