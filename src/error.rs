//! Errors surfaced by the playback engine

use thiserror::Error;

/// Errors that can occur while driving audio playback
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio output device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Audio engine has stopped")]
    EngineStopped,
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        Self::DeviceUnavailable(e.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(e: cpal::BuildStreamError) -> Self {
        Self::DeviceUnavailable(e.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(e: cpal::PlayStreamError) -> Self {
        Self::DeviceUnavailable(e.to_string())
    }
}

impl From<cpal::PauseStreamError> for AudioError {
    fn from(e: cpal::PauseStreamError) -> Self {
        Self::DeviceUnavailable(e.to_string())
    }
}
