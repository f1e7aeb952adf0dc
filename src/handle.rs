//! Thread-safe handle to a noise engine
//!
//! cpal streams cannot move between threads on every platform, so the engine
//! lives on a dedicated thread and callers talk to it over a channel. The
//! channel is the single event queue: commands run one at a time in arrival
//! order, which means
//! - a toggle never starts before the previous one has settled
//! - a volume change sent while a start is warming up the device is applied
//!   to the session that start produces
//! - a stop sent while a start is in flight closes the new session right after

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::audio::{clamp_volume, CpalBackend, OutputBackend, SessionInfo};
use crate::config::NoiseConfig;
use crate::engine::{NoiseEngine, PlaybackStatus};
use crate::error::AudioError;

enum EngineCommand {
    Toggle(Sender<Result<PlaybackStatus, AudioError>>),
    Start(Sender<Result<PlaybackStatus, AudioError>>),
    Stop(Sender<PlaybackStatus>),
    SetVolume(f32),
    Session(Sender<Option<SessionInfo>>),
    Shutdown,
}

/// A toggle that has been queued but may not have run yet
pub struct PendingToggle {
    rx: Receiver<Result<PlaybackStatus, AudioError>>,
}

impl PendingToggle {
    /// Block until the toggle has run
    pub fn wait(self) -> Result<PlaybackStatus, AudioError> {
        self.rx.recv().map_err(|_| AudioError::EngineStopped)?
    }

    /// The outcome, if the toggle has already run
    pub fn try_result(&self) -> Option<Result<PlaybackStatus, AudioError>> {
        self.rx.try_recv().ok()
    }
}

/// Caller-facing control surface for brown noise playback
pub struct NoiseEngineHandle {
    tx: Sender<EngineCommand>,
    is_playing: Arc<AtomicBool>,
    /// Last requested level; held while its command is queued so the
    /// observed level and the queue order never disagree
    volume: Mutex<f32>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl NoiseEngineHandle {
    /// Spawn an engine driving the default output device
    pub fn spawn(config: NoiseConfig) -> std::io::Result<Self> {
        Self::spawn_with(config, CpalBackend::new)
    }

    /// Spawn an engine whose backend is built on the engine thread
    pub fn spawn_with<B, F>(config: NoiseConfig, make_backend: F) -> std::io::Result<Self>
    where
        B: OutputBackend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<EngineCommand>();
        let is_playing = Arc::new(AtomicBool::new(false));
        let thread_playing = Arc::clone(&is_playing);

        let thread_handle = thread::Builder::new()
            .name("noise-engine".to_string())
            .spawn(move || {
                let engine = NoiseEngine::new(make_backend(), &config);
                run_engine(engine, rx, thread_playing);
            })?;

        Ok(Self {
            tx,
            is_playing,
            volume: Mutex::new(config.initial_volume()),
            thread_handle: Some(thread_handle),
        })
    }

    /// Toggle playback and wait for the outcome
    pub fn toggle(&self) -> Result<PlaybackStatus, AudioError> {
        self.request_toggle()?.wait()
    }

    /// Queue a toggle without waiting for it
    pub fn request_toggle(&self) -> Result<PendingToggle, AudioError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::Toggle(reply))?;
        Ok(PendingToggle { rx })
    }

    /// Start playback if idle
    pub fn start(&self) -> Result<PlaybackStatus, AudioError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::Start(reply))?;
        rx.recv().map_err(|_| AudioError::EngineStopped)?
    }

    /// Stop playback if playing
    pub fn stop(&self) -> Result<PlaybackStatus, AudioError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::Stop(reply))?;
        rx.recv().map_err(|_| AudioError::EngineStopped)
    }

    /// Set the volume fraction. Out-of-range values are clamped, NaN is ignored.
    ///
    /// [`Self::volume`] reflects the new level immediately; the audio path
    /// picks it up once the engine reaches this request in its queue.
    pub fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        let Some(level) = clamp_volume(volume) else {
            log::warn!("Ignoring NaN volume request");
            return Ok(());
        };
        let mut current = self.volume.lock().unwrap_or_else(PoisonError::into_inner);
        self.send(EngineCommand::SetVolume(level))?;
        *current = level;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.is_playing() {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Idle
        }
    }

    /// Details of the live session, once queued commands ahead of this have run
    pub fn session(&self) -> Result<Option<SessionInfo>, AudioError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::Session(reply))?;
        rx.recv().map_err(|_| AudioError::EngineStopped)
    }

    fn send(&self, cmd: EngineCommand) -> Result<(), AudioError> {
        self.tx.send(cmd).map_err(|_| AudioError::EngineStopped)
    }
}

impl Drop for NoiseEngineHandle {
    fn drop(&mut self) {
        let _ = self.tx.send(EngineCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("Noise engine thread panicked");
            }
        }
    }
}

fn run_engine<B: OutputBackend>(
    mut engine: NoiseEngine<B>,
    rx: Receiver<EngineCommand>,
    is_playing: Arc<AtomicBool>,
) {
    log::info!("Noise engine started");

    while let Ok(cmd) = rx.recv() {
        match cmd {
            EngineCommand::Toggle(reply) => {
                let result = engine.toggle();
                is_playing.store(engine.is_playing(), Ordering::SeqCst);
                let _ = reply.send(result);
            }
            EngineCommand::Start(reply) => {
                let result = engine.start();
                is_playing.store(engine.is_playing(), Ordering::SeqCst);
                let _ = reply.send(result);
            }
            EngineCommand::Stop(reply) => {
                let status = engine.stop();
                is_playing.store(false, Ordering::SeqCst);
                let _ = reply.send(status);
            }
            EngineCommand::SetVolume(volume) => {
                engine.set_volume(volume);
            }
            EngineCommand::Session(reply) => {
                let _ = reply.send(engine.session());
            }
            EngineCommand::Shutdown => break,
        }
    }

    engine.stop();
    is_playing.store(false, Ordering::SeqCst);
    log::info!("Noise engine stopped");
}
