//! Per-run cooperative cancellation.
//!
//! Every playback run owns one [`CancelSource`]. The run thread holds the
//! matching [`CancelToken`] and blocks in [`CancelToken::wait`], which
//! doubles as the frame interval timer.
//!
//! Cancellation drops the sender half of a zero-capacity channel, so a
//! blocked `recv_timeout` wakes immediately with `Disconnected`.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::error::PlaybackError;

/// Owner side of a run's cancellation handle.
#[derive(Debug)]
pub struct CancelSource {
    sender: Option<Sender<()>>,
    token: CancelToken,
}

/// Observer side, moved into the run thread.
#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: Receiver<()>,
    canceled: Arc<AtomicBool>,
}

impl CancelSource {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            sender: Some(tx),
            token: CancelToken {
                receiver: rx,
                canceled: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Token for the run thread
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&mut self) {
        self.token.canceled.store(true, Ordering::SeqCst);
        // Disconnects every receiver blocked in wait()
        self.sender.take();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CancelSource {
    fn drop(&mut self) {
        // A dropped handle must never leave its run ticking forever
        self.cancel();
    }
}

impl CancelToken {
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Sleep for `interval`, aborting early with [`PlaybackError::Canceled`]
    /// as soon as the owning source is canceled.
    pub fn wait(&self, interval: Duration) -> Result<(), PlaybackError> {
        if self.is_canceled() {
            return Err(PlaybackError::Canceled);
        }
        match self.receiver.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(PlaybackError::Canceled),
        }
    }
}
