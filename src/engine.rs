//! Playback state machine
//!
//! `Idle` and `Playing` are the only states. Every transition goes through
//! `&mut self`, so transitions on one engine never interleave.

use std::fmt;

use crate::audio::{OutputBackend, PlaybackGraph, SessionInfo};
use crate::config::NoiseConfig;
use crate::error::AudioError;
use crate::volume::VolumeController;

/// What the caller observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

/// Brown noise player: state machine over a playback graph and a volume level
pub struct NoiseEngine<B: OutputBackend> {
    status: PlaybackStatus,
    graph: PlaybackGraph<B>,
    volume: VolumeController,
}

impl<B: OutputBackend> NoiseEngine<B> {
    pub fn new(backend: B, config: &NoiseConfig) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            graph: PlaybackGraph::new(backend, config),
            volume: VolumeController::new(config.initial_volume()),
        }
    }

    /// Start if idle, stop if playing. Returns the new status.
    ///
    /// A device failure leaves the engine idle and is returned to the caller.
    pub fn toggle(&mut self) -> Result<PlaybackStatus, AudioError> {
        let result = match self.status {
            PlaybackStatus::Idle => self.start(),
            PlaybackStatus::Playing => Ok(self.stop()),
        };
        debug_assert_eq!(self.is_playing(), self.graph.is_open());
        result
    }

    /// Start playback. No-op when already playing.
    pub fn start(&mut self) -> Result<PlaybackStatus, AudioError> {
        if self.status == PlaybackStatus::Playing {
            return Ok(self.status);
        }

        match self.graph.open(self.volume.volume()) {
            Ok(_) => {
                self.status = PlaybackStatus::Playing;
                Ok(self.status)
            }
            Err(e) => {
                log::warn!("Failed to start playback: {}", e);
                Err(e)
            }
        }
    }

    /// Stop playback. No-op when idle.
    pub fn stop(&mut self) -> PlaybackStatus {
        self.graph.close();
        self.status = PlaybackStatus::Idle;
        self.status
    }

    /// Set the volume fraction, clamped into [0, 1]. Applies to the live
    /// session immediately, or to the next one when idle.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume.set_volume(volume, &self.graph)
    }

    pub fn volume(&self) -> f32 {
        self.volume.volume()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.graph.session()
    }
}
