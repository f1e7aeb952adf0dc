//! Gain stage shared between the control thread and the audio callback
//!
//! The control side stores the target gain as `f32` bits in an atomic; the
//! audio side walks toward it one frame at a time so that volume changes
//! never produce a step discontinuity (audible as a click).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Clamp a requested volume into [0, 1]. NaN maps to `None`.
pub fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

/// Shared gain target, cheap to clone
#[derive(Debug, Clone)]
pub struct GainControl {
    target_bits: Arc<AtomicU32>,
}

impl GainControl {
    pub fn new(gain: f32) -> Self {
        Self {
            target_bits: Arc::new(AtomicU32::new(gain.clamp(0.0, 1.0).to_bits())),
        }
    }

    /// Set the target gain; the audio thread picks it up on its next callback
    pub fn set(&self, gain: f32) {
        self.target_bits
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.target_bits.load(Ordering::Relaxed))
    }
}

/// Per-frame linear ramp toward the target gain.
///
/// Lives on the audio thread.
pub struct GainRamp {
    ramp_frames: u32,
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
}

impl GainRamp {
    /// `ramp_ms` of zero applies target changes instantly.
    pub fn new(sample_rate: u32, ramp_ms: f32, initial_gain: f32) -> Self {
        let gain = initial_gain.clamp(0.0, 1.0);
        let ramp_frames = (f64::from(sample_rate) * f64::from(ramp_ms.max(0.0)) / 1000.0) as u32;
        Self {
            ramp_frames,
            current: gain,
            target: gain,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Retarget the ramp if the target changed since the last call
    pub fn set_target(&mut self, target: f32) {
        if target.to_bits() == self.target.to_bits() {
            return;
        }
        self.target = target;
        if self.ramp_frames == 0 {
            self.current = target;
            self.remaining = 0;
        } else {
            self.remaining = self.ramp_frames;
            self.step = (target - self.current) / self.ramp_frames as f32;
        }
    }

    /// Advance one frame and return the gain for it
    #[inline]
    pub fn next_gain(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else {
                self.current = (self.current + self.step).clamp(0.0, 1.0);
            }
        }
        self.current
    }

    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}
