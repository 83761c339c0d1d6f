//! Events emitted by the frame sequencer, the stream controller, and the
//! external media engine behind the stream controller.

use std::sync::Arc;

use super::error::PlaybackError;

// === Frame Sequencer ===

/// Terminal event of a frame sequencer run. Exactly one fires per run.
#[derive(Clone, Debug)]
pub enum SequencerEvent {
    /// Non-loop run rendered the last frame
    Ended,
    /// Run observed Pause/Stop during an interval wait
    Canceled,
    /// Missing source or render failure; surface keeps the last good frame
    Faulted(Arc<PlaybackError>),
}

// === External media engine ===

/// Signal categories an engine can deliver. Subscription is per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Opened,
    Ended,
    Failed,
    BufferingStarted,
    BufferingEnded,
    Changed,
    ScriptCommand,
}

impl SignalKind {
    pub const ALL: [SignalKind; 7] = [
        SignalKind::Opened,
        SignalKind::Ended,
        SignalKind::Failed,
        SignalKind::BufferingStarted,
        SignalKind::BufferingEnded,
        SignalKind::Changed,
        SignalKind::ScriptCommand,
    ];
}

/// Lifecycle signal raised by a [`MediaEngine`](super::stream::MediaEngine).
#[derive(Clone, Debug, PartialEq)]
pub enum MediaSignal {
    Opened,
    Ended,
    Failed(String),
    BufferingStarted,
    BufferingEnded,
    Changed,
    /// Out-of-band command embedded in the media stream
    ScriptCommand { kind: String, parameter: String },
}

impl MediaSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            MediaSignal::Opened => SignalKind::Opened,
            MediaSignal::Ended => SignalKind::Ended,
            MediaSignal::Failed(_) => SignalKind::Failed,
            MediaSignal::BufferingStarted => SignalKind::BufferingStarted,
            MediaSignal::BufferingEnded => SignalKind::BufferingEnded,
            MediaSignal::Changed => SignalKind::Changed,
            MediaSignal::ScriptCommand { .. } => SignalKind::ScriptCommand,
        }
    }
}

// === Stream Controller ===

/// Event re-exposed by the stream controller to its observers.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    VideoOpened,
    VideoEnded,
    VideoFailed(Arc<PlaybackError>),
    BufferingStarted,
    BufferingEnded,
    Changed,
    ScriptCommand { kind: String, parameter: String },
}

impl StreamEvent {
    pub fn kind(&self) -> SignalKind {
        match self {
            StreamEvent::VideoOpened => SignalKind::Opened,
            StreamEvent::VideoEnded => SignalKind::Ended,
            StreamEvent::VideoFailed(_) => SignalKind::Failed,
            StreamEvent::BufferingStarted => SignalKind::BufferingStarted,
            StreamEvent::BufferingEnded => SignalKind::BufferingEnded,
            StreamEvent::Changed => SignalKind::Changed,
            StreamEvent::ScriptCommand { .. } => SignalKind::ScriptCommand,
        }
    }
}

impl From<MediaSignal> for StreamEvent {
    fn from(signal: MediaSignal) -> Self {
        match signal {
            MediaSignal::Opened => StreamEvent::VideoOpened,
            MediaSignal::Ended => StreamEvent::VideoEnded,
            MediaSignal::Failed(msg) => {
                StreamEvent::VideoFailed(Arc::new(PlaybackError::UpstreamEngine(msg)))
            }
            MediaSignal::BufferingStarted => StreamEvent::BufferingStarted,
            MediaSignal::BufferingEnded => StreamEvent::BufferingEnded,
            MediaSignal::Changed => StreamEvent::Changed,
            MediaSignal::ScriptCommand { kind, parameter } => {
                StreamEvent::ScriptCommand { kind, parameter }
            }
        }
    }
}
