//! Looping playback of a noise buffer

use std::sync::Arc;

use super::gain::{GainControl, GainRamp};

/// Loop-enabled source bound to one buffer
pub struct LoopingSource {
    samples: Arc<[f32]>,
    position: usize,
}

impl LoopingSource {
    pub fn new(samples: Arc<[f32]>) -> Self {
        Self {
            samples,
            position: 0,
        }
    }

    /// Next sample, wrapping to the start at the end of the buffer
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let Some(&sample) = self.samples.get(self.position) else {
            return 0.0;
        };
        self.position += 1;
        if self.position == self.samples.len() {
            self.position = 0;
        }
        sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Everything the output callback needs: source plus gain stage
pub struct NoiseVoice {
    source: LoopingSource,
    control: GainControl,
    ramp: GainRamp,
}

impl NoiseVoice {
    pub fn new(source: LoopingSource, control: GainControl, ramp: GainRamp) -> Self {
        Self {
            source,
            control,
            ramp,
        }
    }

    /// Render mono noise into an interleaved buffer of `channels` channels.
    ///
    /// Every channel of a frame receives the same sample.
    pub fn render<T, F>(&mut self, data: &mut [T], channels: usize, convert: F)
    where
        T: Copy,
        F: Fn(f32) -> T,
    {
        if channels == 0 {
            return;
        }

        self.ramp.set_target(self.control.get());

        for frame in data.chunks_mut(channels) {
            let gain = self.ramp.next_gain();
            let value = convert(self.source.next_sample() * gain);
            frame.fill(value);
        }
    }
}
