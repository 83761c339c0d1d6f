//! Playback core - cancellation, events, frame sequencer, stream controller
//!
//! These modules are independent of any rendering toolkit; hosts plug in
//! through [`RenderSink`](crate::sink::RenderSink) and [`MediaEngine`].

pub mod cancel;
pub mod error;
pub mod observers;
pub mod player_events;
pub mod sequencer;
pub mod stream;

// Re-exports for convenience
pub use cancel::{CancelSource, CancelToken};
pub use error::PlaybackError;
pub use observers::{Observers, SubscriptionId};
pub use player_events::{MediaSignal, SequencerEvent, SignalKind, StreamEvent};
pub use sequencer::{FrameSequencer, PlaybackSnapshot};
pub use stream::{MediaEngine, SignalHandler, StreamController};
