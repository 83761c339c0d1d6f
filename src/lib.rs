//! REEL - frame-sequence and media playlist playback core
//!
//! Re-exports all modules for use by the binary target.

// Core engine (cancellation, events, sequencer, stream controller)
pub mod core;

// Host-facing modules
pub mod cli;
pub mod config;
pub mod paths;
pub mod sink;

// Re-export commonly used types from core
pub use crate::core::{
    FrameSequencer, MediaEngine, PlaybackError, PlaybackSnapshot, SequencerEvent, SignalKind,
    StreamController, StreamEvent, SubscriptionId,
};

pub use config::{PlayerConfig, SequencerConfig, StreamConfig, TransportParams};
pub use sink::{ChannelSink, Drawable, Origin, ProbeSink, RenderSink};
