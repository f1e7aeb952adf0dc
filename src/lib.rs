//! brown-noise - looping brown noise with real-time start/stop and volume
//!
//! The engine synthesises a two second brown noise buffer, loops it through a
//! gain stage to the default output device, and lets a caller toggle playback
//! and change loudness without restarting the sound.
//!
//! [`NoiseEngineHandle`] is the entry point for applications: it owns the
//! engine on a dedicated thread and is safe to share. [`NoiseEngine`] is the
//! same state machine for callers that stay on one thread.

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod volume;

pub use config::{ConfigError, NoiseConfig};
pub use engine::{NoiseEngine, PlaybackStatus};
pub use error::AudioError;
pub use handle::{NoiseEngineHandle, PendingToggle};
pub use volume::VolumeController;
