//! Frame sequencer - timed, cancellable frame-list playback
//!
//! Walks an ordered list of image paths at a fixed cadence and hands each
//! frame to a [`RenderSink`]. Every run ends with exactly one
//! [`SequencerEvent`]: `Ended`, `Canceled` or `Faulted`.
//!
//! # Timing Model
//!
//! Interval is `1000 / fps` whole milliseconds. Each tick waits first and then
//! resolves/renders, so the first frame appears one interval after `play()`.
//! Cancellation is observed in the wait and again when the tick takes the
//! state lock; a frame whose render has begun always finishes (or faults)
//! before the next wait.
//!
//! # Runs
//!
//! One named thread per run. `play()` while a live run exists is a no-op.
//! `pause()` and `stop()` cancel the run's [`CancelSource`]; a following
//! `play()` joins the unwinding run before starting the next one, so two runs
//! never overlap. A looping run also ends (`Ended`) once the loop flag is
//! cleared through `set_config()`.
//!
//! # Cursor
//!
//! - Loop mode: resolve `cursor mod len`, advance with wraparound, then render
//! - Non-loop: render `cursor`, then advance; the run ends once `cursor == len`
//! - `stop()` and `set_position()` bump a cursor epoch so an in-flight
//!   non-loop advance cannot overwrite the cursor they just set

use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::cancel::{CancelSource, CancelToken};
use super::error::PlaybackError;
use super::observers::{Observers, SubscriptionId};
use super::player_events::SequencerEvent;
use crate::config::SequencerConfig;
use crate::sink::{Drawable, RenderSink};

/// Point-in-time copy of the sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub cursor: usize,
    pub running: bool,
    pub paused: bool,
    /// Id of the run owning the active cancellation handle
    pub run: Option<u64>,
}

#[derive(Debug, Default)]
struct PlaybackState {
    cursor: usize,
    running: bool,
    paused: bool,
    cancel: Option<CancelSource>,
    run: Option<u64>,
    last_run: u64,
    cursor_epoch: u64,
}

impl PlaybackState {
    fn has_live_run(&self) -> bool {
        self.running && !self.cancel.as_ref().is_some_and(CancelSource::is_canceled)
    }

    fn rewind(&mut self) {
        self.cursor = 0;
        self.paused = false;
        self.cursor_epoch += 1;
        if let Some(cancel) = self.cancel.as_mut() {
            cancel.cancel();
        }
    }
}

struct Shared {
    config: RwLock<SequencerConfig>,
    state: Mutex<PlaybackState>,
    sink: Mutex<Box<dyn RenderSink>>,
    observers: Observers<SequencerEvent>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn config(&self) -> std::sync::RwLockReadGuard<'_, SequencerConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn render(&self, content: Drawable) -> Result<(), PlaybackError> {
        let path = content.path().to_path_buf();
        self.sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(content)
            .map_err(|source| PlaybackError::Render { path, source })
    }
}

/// Image frame-sequence player.
pub struct FrameSequencer {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for FrameSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequencer")
            .field("state", &self.snapshot())
            .field("observers", &self.shared.observers.len())
            .finish()
    }
}

impl FrameSequencer {
    pub fn new(config: SequencerConfig, sink: impl RenderSink + 'static) -> Self {
        debug!(
            "FrameSequencer created: {} sources, {} fps, loop={}",
            config.sources.len(),
            config.fps,
            config.looping
        );
        Self {
            shared: Arc::new(Shared {
                config: RwLock::new(config),
                state: Mutex::new(PlaybackState::default()),
                sink: Mutex::new(Box::new(sink)),
                observers: Observers::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> SequencerConfig {
        self.shared.config().clone()
    }

    /// Replace the configuration. Sources, fps and origin take effect on the
    /// next tick. Clearing the loop flag ends a looping run before its next
    /// wait; setting it applies from the next run.
    pub fn set_config(&self, config: SequencerConfig) {
        debug!(
            "FrameSequencer config: {} sources, {} fps, loop={}",
            config.sources.len(),
            config.fps,
            config.looping
        );
        *self.shared.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    /// Register a terminal-event observer.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SequencerEvent) + Send + Sync + 'static,
    {
        self.shared.observers.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.observers.remove(id)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let st = self.shared.lock_state();
        PlaybackSnapshot {
            cursor: st.cursor,
            running: st.running,
            paused: st.paused,
            run: st.run,
        }
    }

    pub fn cursor(&self) -> usize {
        self.shared.lock_state().cursor
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock_state().running
    }

    /// Number of configured sources
    pub fn len(&self) -> usize {
        self.shared.config().sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start or resume playback. Returns immediately.
    pub fn play(&self) {
        // Only a canceled or finished run's handle is ever taken, and it is
        // taken under the same state lock that proved the run is not live
        let (mut st, len, looping) = loop {
            // Lock order is config before state
            let (len, looping) = {
                let cfg = self.shared.config();
                (cfg.sources.len(), cfg.looping)
            };
            let st = self.shared.lock_state();
            if st.has_live_run() {
                debug!("play: run already active");
                return;
            }
            let handle = self.lock_worker().take();
            if !st.running && handle.is_none() {
                break (st, len, looping);
            }
            drop(st);

            match handle {
                Some(h) if h.thread().id() == thread::current().id() => {
                    trace!("play: called from run thread, detaching");
                }
                Some(h) => join_run(h),
                // Another caller is joining the unwinding run
                None => thread::sleep(Duration::from_millis(1)),
            }
        };

        if st.paused {
            st.paused = false;
            debug!("play: resuming at frame {}", st.cursor);
        } else {
            st.cursor = 0;
        }

        if len == 0 {
            debug!("play: no sources, nothing to do");
            return;
        }

        let cancel = CancelSource::new();
        let token = cancel.token();
        st.last_run += 1;
        let run_id = st.last_run;
        st.running = true;
        st.cancel = Some(cancel);
        st.run = Some(run_id);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(format!("reel-sequencer-{}", run_id))
            .spawn(move || run(shared, run_id, looping, token));

        match spawned {
            Ok(handle) => {
                info!(
                    "Run {} started at frame {}/{} (loop={})",
                    run_id, st.cursor, len, looping
                );
                // Stored under the state lock so a racing play() cannot clobber it
                *self.lock_worker() = Some(handle);
            }
            Err(e) => {
                error!("Failed to spawn run {}: {}", run_id, e);
                st.running = false;
                st.cancel = None;
                st.run = None;
                drop(st);
                self.shared
                    .observers
                    .emit(&SequencerEvent::Faulted(Arc::new(PlaybackError::Spawn(e))));
            }
        }
    }

    /// Cancel the current run, keeping the cursor for a later `play()`.
    pub fn pause(&self) {
        let mut st = self.shared.lock_state();
        st.paused = true;
        if let Some(cancel) = st.cancel.as_mut() {
            cancel.cancel();
        }
        debug!("pause: at frame {}", st.cursor);
    }

    /// Cancel the current run and rewind to the first frame.
    pub fn stop(&self) {
        self.shared.lock_state().rewind();
        debug!("stop: rewound to frame 0");
    }

    /// Move the cursor. Valid range is `[0, len]`; does not start or stop playback.
    pub fn set_position(&self, index: i32) -> Result<(), PlaybackError> {
        let len = self.len();
        if index < 0 || index as usize > len {
            warn!("set_position: {} out of range [0, {}]", index, len);
            return Err(PlaybackError::InvalidPosition { index, len });
        }

        let mut st = self.shared.lock_state();
        st.cursor = index as usize;
        st.cursor_epoch += 1;
        debug!("set_position: frame {}", index);
        Ok(())
    }

    /// Block until no run thread is alive, up to `timeout`.
    /// Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let (handle, idle) = {
                let mut worker = self.lock_worker();
                match worker.as_ref().map(JoinHandle::is_finished) {
                    None => (None, true),
                    Some(true) => (worker.take(), false),
                    Some(false) => (None, false),
                }
            };

            // Worker lock is released before touching state
            if idle {
                return !self.is_running();
            }
            if let Some(h) = handle {
                join_run(h);
                continue;
            }

            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Join the last run thread, unless we are running on it
    /// (the sequencer dropped from an event callback).
    fn reap_worker(&self) {
        let handle = self.lock_worker().take();
        if let Some(h) = handle {
            if h.thread().id() == thread::current().id() {
                trace!("reap_worker: called from run thread, detaching");
                return;
            }
            join_run(h);
        }
    }
}

impl Drop for FrameSequencer {
    fn drop(&mut self) {
        if let Some(cancel) = self.shared.lock_state().cancel.as_mut() {
            cancel.cancel();
        }
        self.reap_worker();
    }
}

fn join_run(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("run").to_string();
    if handle.join().is_err() {
        error!("{} panicked", name);
    }
}

/// Run thread body: advance, then clear `running` and dispatch one terminal event.
fn run(shared: Arc<Shared>, run_id: u64, looping: bool, token: CancelToken) {
    let result = if looping {
        advance_looping(&shared, &token)
    } else {
        advance_once(&shared, &token)
    };

    let event = match result {
        Ok(()) => SequencerEvent::Ended,
        Err(PlaybackError::Canceled) => SequencerEvent::Canceled,
        Err(e) => SequencerEvent::Faulted(Arc::new(e)),
    };

    let cursor = {
        let mut st = shared.lock_state();
        if st.run == Some(run_id) {
            st.running = false;
            st.cancel = None;
            st.run = None;
        }
        st.cursor
    };

    match &event {
        SequencerEvent::Ended => info!("Run {} ended at frame {}", run_id, cursor),
        SequencerEvent::Canceled => debug!("Run {} canceled at frame {}", run_id, cursor),
        SequencerEvent::Faulted(e) => error!("Run {} faulted: {}", run_id, e),
    }

    shared.observers.emit(&event);
}

fn frame_interval(shared: &Shared) -> Result<Duration, PlaybackError> {
    let cfg = shared.config();
    cfg.frame_interval()
        .ok_or(PlaybackError::InvalidFrameRate(cfg.fps))
}

/// Pause/stop cancel under the state lock; checked with it held, a tick
/// whose wait already elapsed cannot touch the cursor they just set.
fn ensure_live(token: &CancelToken) -> Result<(), PlaybackError> {
    if token.is_canceled() {
        Err(PlaybackError::Canceled)
    } else {
        Ok(())
    }
}

fn require_file(path: PathBuf) -> Result<PathBuf, PlaybackError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(PlaybackError::MissingSource(path))
    }
}

/// Loop mode: wait, resolve, advance with wraparound, check, render. Runs
/// until canceled or faulted; clearing the loop flag or emptying the source
/// list ends the run.
fn advance_looping(shared: &Shared, token: &CancelToken) -> Result<(), PlaybackError> {
    loop {
        if !shared.config().looping {
            debug!("Loop flag cleared, ending run");
            return Ok(());
        }

        token.wait(frame_interval(shared)?)?;

        let (index, path, origin) = {
            let cfg = shared.config();
            let len = cfg.sources.len();
            if len == 0 {
                debug!("Sources cleared during looping run");
                return Ok(());
            }
            let mut st = shared.lock_state();
            ensure_live(token)?;
            let index = st.cursor % len;
            st.cursor = (index + 1) % len;
            trace!("Frame loop: {} -> {}", index, st.cursor);
            (index, cfg.sources[index].clone(), cfg.origin)
        };

        let path = require_file(path)?;
        shared.render(Drawable::Image {
            index,
            path,
            origin,
        })?;
    }
}

/// Non-loop mode: render from the cursor to the end of the list once.
fn advance_once(shared: &Shared, token: &CancelToken) -> Result<(), PlaybackError> {
    loop {
        {
            let len = shared.config().sources.len();
            if shared.lock_state().cursor >= len {
                return Ok(());
            }
        }

        token.wait(frame_interval(shared)?)?;

        let (index, epoch, path, origin) = {
            let cfg = shared.config();
            let st = shared.lock_state();
            ensure_live(token)?;
            // Cursor or list may have moved during the wait
            let Some(path) = cfg.sources.get(st.cursor) else {
                return Ok(());
            };
            (st.cursor, st.cursor_epoch, path.clone(), cfg.origin)
        };

        let path = require_file(path)?;
        shared.render(Drawable::Image {
            index,
            path,
            origin,
        })?;

        let mut st = shared.lock_state();
        if st.cursor_epoch == epoch {
            st.cursor = index + 1;
        } else {
            trace!("Cursor moved during render of frame {}, keeping {}", index, st.cursor);
        }
    }
}
