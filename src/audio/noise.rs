//! Brown noise synthesis
//!
//! White noise is run through a leaky integrator (a one-pole low-pass), which
//! tilts the spectrum down by roughly 6 dB per octave:
//!
//! ```text
//! last_out = (last_out + step * white) / (1 + step)
//! sample   = last_out * makeup_gain
//! ```
//!
//! `last_out` is bounded by 1 whenever `white` is, so every sample lies in
//! `[-makeup_gain, makeup_gain]`.

use std::sync::Arc;

use rand::Rng;

/// Filter coefficients for the brown noise integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Weight of each new white-noise draw
    pub step: f32,
    /// Gain restoring the loudness lost to integration
    pub makeup_gain: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            step: 0.02,
            makeup_gain: 3.5,
        }
    }
}

/// An immutable block of mono noise samples
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl NoiseBuffer {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the samples, for handing to the audio thread
    pub fn shared(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Integrator state, alive for one buffer only
struct BrownFilter {
    params: NoiseParams,
    last_out: f32,
}

impl BrownFilter {
    fn new(params: NoiseParams) -> Self {
        Self {
            params,
            last_out: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, white: f32) -> f32 {
        self.last_out = (self.last_out + self.params.step * white) / (1.0 + self.params.step);
        self.last_out * self.params.makeup_gain
    }
}

/// Number of samples for `duration_secs` at `sample_rate`
pub fn buffer_len(sample_rate: u32, duration_secs: f32) -> usize {
    (f64::from(duration_secs) * f64::from(sample_rate)).round().max(0.0) as usize
}

/// Generate a brown noise buffer using the thread-local random source.
pub fn generate(sample_rate: u32, duration_secs: f32) -> NoiseBuffer {
    generate_with(&mut rand::rng(), NoiseParams::default(), sample_rate, duration_secs)
}

/// Generate a brown noise buffer from the given random source.
///
/// The same sequence of draws always yields the same buffer.
pub fn generate_with<R: Rng>(
    rng: &mut R,
    params: NoiseParams,
    sample_rate: u32,
    duration_secs: f32,
) -> NoiseBuffer {
    debug_assert!(sample_rate > 0, "sample rate must be positive");
    debug_assert!(duration_secs > 0.0, "duration must be positive");

    let len = buffer_len(sample_rate, duration_secs);
    let mut filter = BrownFilter::new(params);

    let samples: Arc<[f32]> = (0..len)
        .map(|_| filter.process(rng.random_range(-1.0..=1.0)))
        .collect();

    log::debug!(
        "Generated {} noise samples at {} Hz ({:.2}s)",
        len,
        sample_rate,
        duration_secs
    );

    NoiseBuffer {
        samples,
        sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_buffer_length() {
        assert_eq!(generate(44100, 2.0).len(), 88200);
        assert_eq!(generate(48000, 2.0).len(), 96000);
        // 0.5 * 3 = 1.5 rounds up
        assert_eq!(generate(3, 0.5).len(), 2);
        assert_eq!(generate(1000, 0.0104).len(), 10);
    }

    #[test]
    fn test_samples_bounded() {
        let buffer = generate(48000, 2.0);
        assert_eq!(buffer.sample_rate(), 48000);
        assert!(buffer
            .samples()
            .iter()
            .all(|s| s.is_finite() && (-3.5..=3.5).contains(s)));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let params = NoiseParams::default();
        let a = generate_with(&mut StdRng::seed_from_u64(7), params, 8000, 1.0);
        let b = generate_with(&mut StdRng::seed_from_u64(7), params, 8000, 1.0);
        let c = generate_with(&mut StdRng::seed_from_u64(8), params, 8000, 1.0);

        assert_eq!(a.samples(), b.samples());
        assert_ne!(a.samples(), c.samples());
    }

    #[test]
    fn test_filter_recurrence() {
        let mut filter = BrownFilter::new(NoiseParams::default());

        // A constant full-scale input converges toward +1 (scaled by 3.5)
        let first = filter.process(1.0);
        approx::assert_abs_diff_eq!(first, 0.02 / 1.02 * 3.5, epsilon = 1e-6);

        let second = filter.process(1.0);
        let expected_last = (0.02 / 1.02 + 0.02) / 1.02;
        approx::assert_abs_diff_eq!(second, expected_last * 3.5, epsilon = 1e-6);

        // The carried state stays unscaled
        approx::assert_abs_diff_eq!(filter.last_out, expected_last, epsilon = 1e-6);
    }

    #[test]
    fn test_extreme_input_stays_in_range() {
        let mut filter = BrownFilter::new(NoiseParams::default());
        for _ in 0..100_000 {
            let s = filter.process(1.0);
            assert!(s <= 3.5);
        }
        for _ in 0..100_000 {
            let s = filter.process(-1.0);
            assert!(s >= -3.5);
        }
    }

    #[test]
    fn test_custom_params() {
        let params = NoiseParams {
            step: 0.05,
            makeup_gain: 1.0,
        };
        let buffer = generate_with(&mut StdRng::seed_from_u64(1), params, 22050, 0.25);
        assert_eq!(buffer.len(), 5513);
        assert!(buffer.samples().iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn test_low_frequency_bias() {
        // Adjacent samples of brown noise are strongly correlated, unlike white noise
        let buffer = generate_with(
            &mut StdRng::seed_from_u64(42),
            NoiseParams::default(),
            44100,
            1.0,
        );
        let s = buffer.samples();
        let mean_step: f32 =
            s.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>() / (s.len() - 1) as f32;
        let mean_abs: f32 = s.iter().map(|x| x.abs()).sum::<f32>() / s.len() as f32;
        assert!(mean_step < mean_abs);
    }
}
