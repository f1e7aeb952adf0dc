//! Playback graph: noise buffer -> looping source -> gain -> device output

use std::fmt;

use super::device::OutputBackend;
use super::gain::{GainControl, GainRamp};
use super::noise::{self, NoiseParams};
use super::source::{LoopingSource, NoiseVoice};
use crate::config::NoiseConfig;
use crate::error::AudioError;

/// Identity of one playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only view of the live session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub sample_rate: u32,
    pub buffer_len: usize,
    pub gain: f32,
}

struct Session<S> {
    id: SessionId,
    sample_rate: u32,
    buffer_len: usize,
    gain: GainControl,
    stream: S,
}

/// Owns the output device and the single live session
pub struct PlaybackGraph<B: OutputBackend> {
    backend: B,
    params: NoiseParams,
    duration_secs: f32,
    gain_ramp_ms: f32,
    session: Option<Session<B::Stream>>,
    next_id: u64,
}

impl<B: OutputBackend> PlaybackGraph<B> {
    pub fn new(backend: B, config: &NoiseConfig) -> Self {
        Self {
            backend,
            params: config.noise_params(),
            duration_secs: config.duration_secs,
            gain_ramp_ms: config.gain_ramp_ms,
            session: None,
            next_id: 1,
        }
    }

    /// Start looping a freshly generated noise buffer at `volume`.
    ///
    /// If a session is already open it is kept and its id returned; the
    /// graph never runs two voices.
    pub fn open(&mut self, volume: f32) -> Result<SessionId, AudioError> {
        if let Some(session) = &self.session {
            log::warn!("Session {} already open, not starting another", session.id);
            return Ok(session.id);
        }

        let sample_rate = self.backend.ensure_ready()?;

        let buffer = noise::generate_with(
            &mut rand::rng(),
            self.params,
            sample_rate,
            self.duration_secs,
        );
        let buffer_len = buffer.len();

        let gain = GainControl::new(volume);
        let voice = NoiseVoice::new(
            LoopingSource::new(buffer.shared()),
            gain.clone(),
            GainRamp::new(sample_rate, self.gain_ramp_ms, gain.get()),
        );

        let stream = self.backend.start(voice)?;

        let id = SessionId(self.next_id);
        self.next_id += 1;

        log::info!(
            "Session {} started: {} samples at {} Hz, gain {:.2}",
            id,
            buffer_len,
            sample_rate,
            gain.get()
        );

        self.session = Some(Session {
            id,
            sample_rate,
            buffer_len,
            gain,
            stream,
        });
        Ok(id)
    }

    /// Stop the live session and release its resources. No-op when closed.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            self.backend.stop(session.stream);
            log::info!("Session {} stopped", session.id);
        }
    }

    /// Update the live gain in place. Returns false when no session is open.
    pub fn set_gain(&self, volume: f32) -> bool {
        match &self.session {
            Some(session) => {
                session.gain.set(volume);
                log::debug!("Session {} gain -> {:.2}", session.id, session.gain.get());
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.session.as_ref().map(|s| SessionInfo {
            id: s.id,
            sample_rate: s.sample_rate,
            buffer_len: s.buffer_len,
            gain: s.gain.get(),
        })
    }

    #[cfg(test)]
    pub(crate) fn stream_mut(&mut self) -> Option<&mut B::Stream> {
        self.session.as_mut().map(|s| &mut s.stream)
    }
}

impl<B: OutputBackend> Drop for PlaybackGraph<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::device::mock::MockBackend;

    fn config() -> NoiseConfig {
        NoiseConfig {
            duration_secs: 0.5,
            gain_ramp_ms: 0.0,
            ..NoiseConfig::default()
        }
    }

    #[test]
    fn test_open_sizes_buffer_to_device_rate() {
        let (backend, _) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());

        let id = graph.open(0.4).unwrap();
        let info = graph.session().unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.buffer_len, 4000);
        assert_eq!(info.gain, 0.4);
    }

    #[test]
    fn test_close_is_idempotent() {
        let (backend, state) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());

        graph.close();
        graph.open(1.0).unwrap();
        graph.close();
        graph.close();

        let state = state.lock().unwrap();
        assert_eq!(state.started, 1);
        assert_eq!(state.stopped, 1);
        assert_eq!(state.live_streams, 0);
        assert!(!graph.is_open());
    }

    #[test]
    fn test_device_reused_across_sessions() {
        let (backend, state) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());

        let first = graph.open(1.0).unwrap();
        graph.close();
        let second = graph.open(1.0).unwrap();

        assert_ne!(first, second);
        assert_eq!(state.lock().unwrap().acquisitions, 1);
    }

    #[test]
    fn test_open_twice_keeps_single_voice() {
        let (backend, state) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());

        let first = graph.open(1.0).unwrap();
        let second = graph.open(0.2).unwrap();

        assert_eq!(first, second);
        assert_eq!(state.lock().unwrap().live_streams, 1);
        assert_eq!(graph.session().unwrap().gain, 1.0);
    }

    #[test]
    fn test_set_gain_reaches_audio_path() {
        let (backend, _) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());

        assert!(!graph.set_gain(0.5));

        graph.open(1.0).unwrap();
        assert!(graph.set_gain(0.0));

        let stream = graph.stream_mut().unwrap();
        let mut data = [1.0f32; 64];
        stream.voice.render(&mut data, 2, |s| s);
        assert!(data.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_open_failure_leaves_graph_closed() {
        let (backend, state) = MockBackend::new(8000);
        state.lock().unwrap().fail_next_open = true;
        let mut graph = PlaybackGraph::new(backend, &config());

        assert!(matches!(graph.open(1.0), Err(AudioError::DeviceUnavailable(_))));
        assert!(!graph.is_open());
        assert_eq!(state.lock().unwrap().started, 0);
    }

    #[test]
    fn test_drop_releases_stream() {
        let (backend, state) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &config());
        graph.open(1.0).unwrap();
        drop(graph);
        assert_eq!(state.lock().unwrap().live_streams, 0);
    }
}
