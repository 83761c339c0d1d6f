//! Stream controller - playlist control over an external media engine
//!
//! The engine owns decoding and timing. The controller layers a source
//! cursor, pause/stop semantics and playlist looping on top, and re-exposes
//! the engine's lifecycle signals as [`StreamEvent`]s.
//!
//! Engine signals are linked lazily: the first observer of a
//! [`SignalKind`] subscribes that kind on the engine, the last one leaving
//! unsubscribes it. `Ended` additionally stays linked while looping is on, so
//! the playlist keeps advancing with nobody listening.
//!
//! Playlist steps are serialized: a `play()` requested while another step is
//! in progress, including an `Ended` delivered from inside an engine call, is
//! queued and carried out by the caller already stepping. No state or engine
//! lock is held across an engine call.

use anyhow::Result;
use log::{debug, info, trace, warn};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::time::Duration;

use super::error::PlaybackError;
use super::observers::{Observers, SubscriptionId};
use super::player_events::{MediaSignal, SignalKind, StreamEvent};
use crate::config::StreamConfig;
use crate::sink::{Drawable, RenderSink};

/// Callback an engine invokes for subscribed signals
pub type SignalHandler = Arc<dyn Fn(MediaSignal) + Send + Sync>;

/// Black-box decoder/player driven by [`StreamController`].
///
/// Signals may be delivered on any thread, including synchronously from
/// inside `open()` or `play()`.
pub trait MediaEngine: Send {
    fn open(&mut self, source: &Path) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);

    fn position(&self) -> Duration;
    fn set_position(&mut self, position: Duration);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn speed_ratio(&self) -> f64;
    fn set_speed_ratio(&mut self, ratio: f64);

    /// Route signals of `kind` to `handler` until [`MediaEngine::unsubscribe`].
    fn subscribe(&mut self, kind: SignalKind, handler: SignalHandler);
    fn unsubscribe(&mut self, kind: SignalKind);
}

#[derive(Debug, Default)]
struct StreamState {
    cursor: usize,
    paused: bool,
    /// Bumped by `stop()` so an in-flight step does not advance a rewound cursor
    epoch: u64,
}

struct StreamInner {
    me: Weak<StreamInner>,
    config: RwLock<StreamConfig>,
    state: Mutex<StreamState>,
    engine: Mutex<Box<dyn MediaEngine>>,
    sink: Mutex<Box<dyn RenderSink>>,
    observers: HashMap<SignalKind, Observers<StreamEvent>>,
    /// Kinds currently subscribed on the engine
    links: Mutex<HashSet<SignalKind>>,
    /// Set while some caller is running playlist steps
    stepping: AtomicBool,
    play_pending: AtomicBool,
}

/// Media playlist player.
pub struct StreamController {
    inner: Arc<StreamInner>,
}

impl std::fmt::Debug for StreamController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.lock_state();
        f.debug_struct("StreamController")
            .field("cursor", &st.cursor)
            .field("paused", &st.paused)
            .field("links", &self.inner.lock_links().len())
            .finish()
    }
}

impl StreamController {
    /// Build a controller; transport parameters from `config` are pushed to the engine.
    pub fn new(
        config: StreamConfig,
        engine: impl MediaEngine + 'static,
        sink: impl RenderSink + 'static,
    ) -> Self {
        let mut engine: Box<dyn MediaEngine> = Box::new(engine);
        let transport = &config.transport;
        engine.set_volume(transport.volume);
        engine.set_speed_ratio(transport.speed_ratio);
        engine.set_position(Duration::from_millis(transport.position_ms));

        debug!(
            "StreamController created: {} sources, loop={}",
            config.sources.len(),
            config.looping
        );

        let inner = Arc::new_cyclic(|me| StreamInner {
            me: me.clone(),
            config: RwLock::new(config),
            state: Mutex::new(StreamState::default()),
            engine: Mutex::new(engine),
            sink: Mutex::new(Box::new(sink)),
            observers: SignalKind::ALL
                .iter()
                .map(|kind| (*kind, Observers::new()))
                .collect(),
            links: Mutex::new(HashSet::new()),
            stepping: AtomicBool::new(false),
            play_pending: AtomicBool::new(false),
        });
        inner.sync_link(SignalKind::Ended);

        Self { inner }
    }

    pub fn config(&self) -> StreamConfig {
        self.inner.config().clone()
    }

    pub fn set_config(&self, config: StreamConfig) {
        *self.inner.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        self.inner.sync_link(SignalKind::Ended);
    }

    pub fn set_looping(&self, looping: bool) {
        self.inner
            .config
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .looping = looping;
        self.inner.sync_link(SignalKind::Ended);
    }

    /// Observe one kind of event. The engine signal is linked on first use.
    pub fn subscribe<F>(&self, kind: SignalKind, callback: F) -> SubscriptionId
    where
        F: Fn(&StreamEvent) + Send + Sync + 'static,
    {
        let id = self.inner.observers_of(kind).add(callback);
        self.inner.sync_link(kind);
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        for kind in SignalKind::ALL {
            if self.inner.observers_of(kind).remove(id) {
                self.inner.sync_link(kind);
                return true;
            }
        }
        false
    }

    pub fn cursor(&self) -> usize {
        self.inner.lock_state().cursor
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock_state().paused
    }

    /// Resume if paused, otherwise open and start the source at the cursor.
    /// Failures are reported as `VideoFailed`.
    pub fn play(&self) {
        self.inner.request_play();
    }

    pub fn pause(&self) {
        let cursor = {
            let mut st = self.inner.lock_state();
            st.paused = true;
            st.cursor
        };
        self.inner.lock_engine().pause();
        debug!("pause: source {}", cursor);
    }

    pub fn stop(&self) {
        {
            let mut st = self.inner.lock_state();
            st.cursor = 0;
            st.paused = false;
            st.epoch += 1;
        }
        self.inner.lock_engine().stop();
        debug!("stop: rewound to source 0");
    }

    pub fn position(&self) -> Duration {
        self.inner.lock_engine().position()
    }

    pub fn set_position(&self, position: Duration) {
        self.inner.lock_engine().set_position(position);
    }

    pub fn volume(&self) -> f64 {
        self.inner.lock_engine().volume()
    }

    pub fn set_volume(&self, volume: f64) {
        self.inner.lock_engine().set_volume(volume);
    }

    pub fn speed_ratio(&self) -> f64 {
        self.inner.lock_engine().speed_ratio()
    }

    pub fn set_speed_ratio(&self, ratio: f64) {
        self.inner.lock_engine().set_speed_ratio(ratio);
    }
}

impl StreamInner {
    fn lock_state(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_engine(&self) -> MutexGuard<'_, Box<dyn MediaEngine>> {
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_links(&self) -> MutexGuard<'_, HashSet<SignalKind>> {
        self.links.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn config(&self) -> std::sync::RwLockReadGuard<'_, StreamConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn observers_of(&self, kind: SignalKind) -> &Observers<StreamEvent> {
        // Every kind is inserted at construction
        &self.observers[&kind]
    }

    /// Subscribe or unsubscribe `kind` on the engine to match demand.
    fn sync_link(&self, kind: SignalKind) {
        let wanted = !self.observers_of(kind).is_empty()
            || (kind == SignalKind::Ended && self.config().looping);

        let mut links = self.lock_links();
        let linked = links.contains(&kind);
        if wanted && !linked {
            let me = self.me.clone();
            let handler: SignalHandler = Arc::new(move |signal: MediaSignal| {
                if let Some(inner) = me.upgrade() {
                    inner.on_signal(signal);
                }
            });
            self.lock_engine().subscribe(kind, handler);
            links.insert(kind);
            trace!("Linked engine signal {:?}", kind);
        } else if !wanted && linked {
            self.lock_engine().unsubscribe(kind);
            links.remove(&kind);
            trace!("Unlinked engine signal {:?}", kind);
        }
    }

    fn on_signal(&self, signal: MediaSignal) {
        trace!("Engine signal: {:?}", signal);
        if signal == MediaSignal::Ended && self.config().looping {
            debug!("Media ended, advancing playlist");
            self.request_play();
        }
        let event = StreamEvent::from(signal);
        self.observers_of(event.kind()).emit(&event);
    }

    fn fail(&self, error: PlaybackError) {
        warn!("Stream failed: {}", error);
        self.observers_of(SignalKind::Failed)
            .emit(&StreamEvent::VideoFailed(Arc::new(error)));
    }

    /// Queue one playlist step and run queued steps unless another caller
    /// already is. Returns without stepping when called from inside a step.
    fn request_play(&self) {
        self.play_pending.store(true, Ordering::SeqCst);
        while self.play_pending.load(Ordering::SeqCst)
            && self
                .stepping
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            while self.play_pending.swap(false, Ordering::SeqCst) {
                self.play_step();
            }
            self.stepping.store(false, Ordering::SeqCst);
        }
    }

    fn play_step(&self) {
        let (index, epoch, path, origin, looping, len) = {
            let cfg = self.config();
            let mut st = self.lock_state();
            if st.paused {
                st.paused = false;
                let cursor = st.cursor;
                drop(st);
                drop(cfg);
                self.lock_engine().play();
                debug!("play: resumed source {}", cursor);
                return;
            }

            let len = cfg.sources.len();
            if len == 0 {
                debug!("play: no sources, nothing to do");
                return;
            }
            if st.cursor >= len {
                st.cursor = 0;
            }
            (
                st.cursor,
                st.epoch,
                cfg.sources[st.cursor].clone(),
                cfg.origin,
                cfg.looping,
                len,
            )
        };

        if !path.is_file() {
            self.fail(PlaybackError::MissingSource(path));
            return;
        }

        let opened = self.lock_engine().open(&path);
        if let Err(e) = opened {
            self.fail(PlaybackError::UpstreamEngine(format!("{:#}", e)));
            return;
        }

        let drawn = self
            .sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Drawable::Video {
                path: path.clone(),
                origin,
            });
        if let Err(source) = drawn {
            self.fail(PlaybackError::Render { path, source });
            return;
        }

        self.lock_engine().play();
        info!("Playing source {}: {}", index, path.display());

        if looping {
            let mut st = self.lock_state();
            if st.epoch == epoch {
                st.cursor = (index + 1) % len;
            } else {
                trace!("Stopped while opening source {}, keeping cursor {}", index, st.cursor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportParams;
    use crate::sink::{ChannelSink, Origin};
    use crossbeam_channel::{Receiver, unbounded};
    use std::path::PathBuf;
    use uuid::Uuid;

    type Handlers = Arc<Mutex<HashMap<SignalKind, SignalHandler>>>;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct EngineLog {
        opened: Vec<PathBuf>,
        plays: usize,
        pauses: usize,
        stops: usize,
        position: Duration,
        volume: f64,
        speed: f64,
        fail_open: bool,
        /// Number of upcoming `play()` calls that deliver `Ended` inline
        end_inline: usize,
    }

    #[derive(Default, Clone)]
    struct FakeEngine {
        log: Arc<Mutex<EngineLog>>,
        handlers: Handlers,
    }

    impl FakeEngine {
        /// Deliver a signal as the engine thread would
        fn fire(&self, signal: MediaSignal) {
            let handler = self.handlers.lock().unwrap().get(&signal.kind()).cloned();
            if let Some(h) = handler {
                h(signal);
            }
        }

        fn linked(&self) -> HashSet<SignalKind> {
            self.handlers.lock().unwrap().keys().copied().collect()
        }

        fn log(&self) -> EngineLog {
            self.log.lock().unwrap().clone()
        }
    }

    impl MediaEngine for FakeEngine {
        fn open(&mut self, source: &Path) -> Result<()> {
            let mut log = self.log.lock().unwrap();
            if log.fail_open {
                anyhow::bail!("unsupported codec");
            }
            log.opened.push(source.to_path_buf());
            Ok(())
        }
        fn play(&mut self) {
            let end_now = {
                let mut log = self.log.lock().unwrap();
                log.plays += 1;
                if log.end_inline > 0 {
                    log.end_inline -= 1;
                    true
                } else {
                    false
                }
            };
            if end_now {
                self.fire(MediaSignal::Ended);
            }
        }
        fn pause(&mut self) {
            self.log.lock().unwrap().pauses += 1;
        }
        fn stop(&mut self) {
            self.log.lock().unwrap().stops += 1;
        }
        fn position(&self) -> Duration {
            self.log.lock().unwrap().position
        }
        fn set_position(&mut self, position: Duration) {
            self.log.lock().unwrap().position = position;
        }
        fn volume(&self) -> f64 {
            self.log.lock().unwrap().volume
        }
        fn set_volume(&mut self, volume: f64) {
            self.log.lock().unwrap().volume = volume;
        }
        fn speed_ratio(&self) -> f64 {
            self.log.lock().unwrap().speed
        }
        fn set_speed_ratio(&mut self, ratio: f64) {
            self.log.lock().unwrap().speed = ratio;
        }
        fn subscribe(&mut self, kind: SignalKind, handler: SignalHandler) {
            self.handlers.lock().unwrap().insert(kind, handler);
        }
        fn unsubscribe(&mut self, kind: SignalKind) {
            self.handlers.lock().unwrap().remove(&kind);
        }
    }

    struct Fixture {
        dir: PathBuf,
        videos: Vec<PathBuf>,
    }

    impl Fixture {
        fn new(names: &[&str]) -> Self {
            let dir = std::env::temp_dir().join(format!("reel-stream-{}", Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();
            let videos = names
                .iter()
                .map(|n| {
                    let p = dir.join(n);
                    std::fs::write(&p, b"video").unwrap();
                    p
                })
                .collect();
            Self { dir, videos }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    fn controller(config: StreamConfig) -> (StreamController, FakeEngine, Receiver<Drawable>) {
        let engine = FakeEngine::default();
        let (tx, rx) = unbounded();
        let ctl = StreamController::new(config, engine.clone(), ChannelSink::new(tx));
        (ctl, engine, rx)
    }

    fn record(ctl: &StreamController, kind: SignalKind) -> (SubscriptionId, Receiver<StreamEvent>) {
        let (tx, rx) = unbounded();
        let id = ctl.subscribe(kind, move |e: &StreamEvent| {
            tx.send(e.clone()).ok();
        });
        (id, rx)
    }

    #[test]
    fn test_play_opens_current_source() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let mut cfg = StreamConfig::new(fx.videos.clone());
        cfg.origin = Origin::new(5, 6);
        let (ctl, engine, draws) = controller(cfg);

        ctl.play();
        let log = engine.log();
        assert_eq!(log.opened, vec![fx.videos[0].clone()]);
        assert_eq!(log.plays, 1);
        assert_eq!(
            draws.try_recv().unwrap(),
            Drawable::Video {
                path: fx.videos[0].clone(),
                origin: Origin::new(5, 6),
            }
        );
        // No loop: cursor stays, next play reopens the same source
        assert_eq!(ctl.cursor(), 0);
        ctl.play();
        assert_eq!(engine.log().opened, vec![fx.videos[0].clone(), fx.videos[0].clone()]);
    }

    #[test]
    fn test_loop_advances_cursor_on_play() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));

        ctl.play();
        // Advanced right after opening the current item
        assert_eq!(ctl.cursor(), 1);
        ctl.play();
        assert_eq!(ctl.cursor(), 0);
        ctl.play();
        assert_eq!(
            engine.log().opened,
            vec![fx.videos[0].clone(), fx.videos[1].clone(), fx.videos[0].clone()]
        );
    }

    #[test]
    fn test_pause_then_play_resumes_without_reopen() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));

        ctl.play();
        ctl.pause();
        assert!(ctl.is_paused());
        ctl.play();
        assert!(!ctl.is_paused());

        let log = engine.log();
        assert_eq!(log.opened.len(), 1);
        assert_eq!(log.pauses, 1);
        assert_eq!(log.plays, 2);
        assert_eq!(ctl.cursor(), 1);
    }

    #[test]
    fn test_stop_resets_cursor_and_pause() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));

        ctl.play();
        ctl.pause();
        ctl.stop();
        assert_eq!(ctl.cursor(), 0);
        assert!(!ctl.is_paused());
        assert_eq!(engine.log().stops, 1);

        ctl.play();
        assert_eq!(engine.log().opened.last(), Some(&fx.videos[0]));
    }

    #[test]
    fn test_empty_sources_noop() {
        let (ctl, engine, draws) = controller(StreamConfig::default());
        let (_id, failed) = record(&ctl, SignalKind::Failed);
        ctl.play();
        assert_eq!(engine.log().plays, 0);
        assert!(draws.try_recv().is_err());
        assert!(failed.try_recv().is_err());
    }

    #[test]
    fn test_missing_source_reports_video_failed() {
        let fx = Fixture::new(&["one.mp4"]);
        let missing = fx.dir.join("absent.mp4");
        let (ctl, engine, draws) = controller(StreamConfig::new(vec![missing.clone()]));
        let (_id, failed) = record(&ctl, SignalKind::Failed);

        ctl.play();
        match failed.try_recv().unwrap() {
            StreamEvent::VideoFailed(e) => {
                assert!(matches!(&*e, PlaybackError::MissingSource(p) if *p == missing));
                assert!(!e.to_string().is_empty());
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(engine.log().opened.is_empty());
        assert!(draws.try_recv().is_err());
    }

    #[test]
    fn test_engine_open_error_reports_upstream() {
        let fx = Fixture::new(&["one.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));
        engine.log.lock().unwrap().fail_open = true;
        let (_id, failed) = record(&ctl, SignalKind::Failed);

        ctl.play();
        match failed.try_recv().unwrap() {
            StreamEvent::VideoFailed(e) => {
                assert!(matches!(&*e, PlaybackError::UpstreamEngine(m) if m.contains("unsupported codec")));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(engine.log().plays, 0);
        assert_eq!(ctl.cursor(), 0);
    }

    #[test]
    fn test_signals_linked_lazily() {
        let (ctl, engine, _draws) = controller(StreamConfig::default());
        assert!(engine.linked().is_empty());

        // Nothing forwarded while unobserved
        engine.fire(MediaSignal::BufferingStarted);

        let (id, rx) = record(&ctl, SignalKind::BufferingStarted);
        assert_eq!(engine.linked(), HashSet::from([SignalKind::BufferingStarted]));
        engine.fire(MediaSignal::BufferingStarted);
        assert!(matches!(rx.try_recv().unwrap(), StreamEvent::BufferingStarted));
        assert!(rx.try_recv().is_err());

        let (id2, _rx2) = record(&ctl, SignalKind::BufferingStarted);
        assert!(ctl.unsubscribe(id));
        assert_eq!(engine.linked().len(), 1);
        assert!(ctl.unsubscribe(id2));
        assert!(engine.linked().is_empty());
        assert!(!ctl.unsubscribe(id2));
    }

    #[test]
    fn test_forwards_every_signal_kind() {
        let (ctl, engine, _draws) = controller(StreamConfig::default());
        let (tx, rx) = unbounded();
        for kind in SignalKind::ALL {
            let tx = tx.clone();
            ctl.subscribe(kind, move |e: &StreamEvent| {
                tx.send(e.kind()).ok();
            });
        }

        engine.fire(MediaSignal::Opened);
        engine.fire(MediaSignal::Changed);
        engine.fire(MediaSignal::ScriptCommand {
            kind: "caption".into(),
            parameter: "hi".into(),
        });
        engine.fire(MediaSignal::Failed("decoder".into()));
        engine.fire(MediaSignal::BufferingEnded);

        let kinds: Vec<SignalKind> = rx.try_iter().collect();
        assert_eq!(
            kinds,
            vec![
                SignalKind::Opened,
                SignalKind::Changed,
                SignalKind::ScriptCommand,
                SignalKind::Failed,
                SignalKind::BufferingEnded,
            ]
        );
    }

    #[test]
    fn test_ended_with_loop_plays_next_and_forwards() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));
        let (_id, ended) = record(&ctl, SignalKind::Ended);

        ctl.play();
        engine.fire(MediaSignal::Ended);

        assert!(matches!(ended.try_recv().unwrap(), StreamEvent::VideoEnded));
        assert_eq!(engine.log().opened, vec![fx.videos[0].clone(), fx.videos[1].clone()]);
        assert_eq!(ctl.cursor(), 0);
    }

    #[test]
    fn test_ended_inside_engine_play_advances_after_return() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let videos = fx.videos.clone();
        let (done_tx, done_rx) = unbounded();

        // Zero-length clip: the engine reports Ended before play() returns
        std::thread::spawn(move || {
            let (ctl, engine, _draws) = controller(StreamConfig::new(videos).with_loop(true));
            engine.log.lock().unwrap().end_inline = 1;
            let (_id, ended) = record(&ctl, SignalKind::Ended);
            ctl.play();
            done_tx
                .send((engine.log(), ctl.cursor(), ended.try_iter().count()))
                .ok();
        });

        let (log, cursor, ended) = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(log.opened, vec![fx.videos[0].clone(), fx.videos[1].clone()]);
        assert_eq!(log.plays, 2);
        assert_eq!(cursor, 0);
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_ended_without_loop_only_forwards() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()));
        assert!(engine.linked().is_empty());
        let (_id, ended) = record(&ctl, SignalKind::Ended);

        ctl.play();
        engine.fire(MediaSignal::Ended);
        assert!(matches!(ended.try_recv().unwrap(), StreamEvent::VideoEnded));
        assert_eq!(engine.log().opened.len(), 1);
    }

    #[test]
    fn test_loop_keeps_ended_linked_without_observers() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()));
        assert!(!engine.linked().contains(&SignalKind::Ended));

        ctl.set_looping(true);
        assert!(engine.linked().contains(&SignalKind::Ended));

        ctl.play();
        engine.fire(MediaSignal::Ended);
        assert_eq!(engine.log().opened.len(), 2);

        ctl.set_looping(false);
        assert!(!engine.linked().contains(&SignalKind::Ended));
    }

    #[test]
    fn test_transport_passthrough() {
        let mut cfg = StreamConfig::default();
        cfg.transport = TransportParams {
            position_ms: 1500,
            volume: 0.8,
            speed_ratio: 2.0,
        };
        let (ctl, engine, _draws) = controller(cfg);

        assert_eq!(ctl.position(), Duration::from_millis(1500));
        assert_eq!(ctl.volume(), 0.8);
        assert_eq!(ctl.speed_ratio(), 2.0);

        ctl.set_volume(0.1);
        ctl.set_speed_ratio(0.5);
        ctl.set_position(Duration::from_secs(3));
        let log = engine.log();
        assert_eq!(log.volume, 0.1);
        assert_eq!(log.speed, 0.5);
        assert_eq!(log.position, Duration::from_secs(3));
    }

    #[test]
    fn test_shrunk_playlist_wraps_cursor() {
        let fx = Fixture::new(&["one.mp4", "two.mp4"]);
        let (ctl, engine, _draws) = controller(StreamConfig::new(fx.videos.clone()).with_loop(true));
        ctl.play();
        assert_eq!(ctl.cursor(), 1);

        ctl.set_config(StreamConfig::new(vec![fx.videos[1].clone()]).with_loop(true));
        ctl.play();
        assert_eq!(engine.log().opened.last(), Some(&fx.videos[1]));
        assert_eq!(ctl.cursor(), 0);
    }
}
