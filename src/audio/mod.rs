//! Audio module - noise synthesis and output
//!
//! This module provides:
//! - Brown noise buffer generation
//! - A looping, gain-controlled playback graph
//! - Output device access through cpal

mod device;
mod gain;
mod graph;
mod noise;
mod source;

#[cfg(test)]
pub(crate) use device::mock;

pub use device::{CpalBackend, OutputBackend};
pub use gain::{clamp_volume, GainControl, GainRamp};
pub use graph::{PlaybackGraph, SessionId, SessionInfo};
pub use noise::{buffer_len, generate, generate_with, NoiseBuffer, NoiseParams};
pub use source::{LoopingSource, NoiseVoice};
