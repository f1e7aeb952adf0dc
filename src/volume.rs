//! Volume level held independently of playback

use crate::audio::{clamp_volume, OutputBackend, PlaybackGraph};

/// The caller's requested loudness, as a fraction in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeController {
    level: f32,
}

impl VolumeController {
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_volume(level).unwrap_or(0.0),
        }
    }

    /// Store a new level and push it to the live session, if any.
    ///
    /// Out-of-range values are clamped. NaN is ignored.
    pub fn set_volume<B: OutputBackend>(&mut self, volume: f32, graph: &PlaybackGraph<B>) -> f32 {
        match clamp_volume(volume) {
            Some(level) => {
                self.level = level;
                graph.set_gain(level);
            }
            None => log::warn!("Ignoring NaN volume request"),
        }
        self.level
    }

    pub fn volume(&self) -> f32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockBackend;
    use crate::config::NoiseConfig;

    #[test]
    fn test_clamps_out_of_range() {
        let (backend, _) = MockBackend::new(8000);
        let graph = PlaybackGraph::new(backend, &NoiseConfig::default());
        let mut volume = VolumeController::new(0.5);

        assert_eq!(volume.set_volume(-0.2, &graph), 0.0);
        assert_eq!(volume.set_volume(1.5, &graph), 1.0);
        assert_eq!(volume.volume(), 1.0);
    }

    #[test]
    fn test_nan_keeps_previous_level() {
        let (backend, _) = MockBackend::new(8000);
        let graph = PlaybackGraph::new(backend, &NoiseConfig::default());
        let mut volume = VolumeController::new(0.4);

        assert_eq!(volume.set_volume(f32::NAN, &graph), 0.4);
    }

    #[test]
    fn test_forwards_to_live_session() {
        let (backend, _) = MockBackend::new(8000);
        let mut graph = PlaybackGraph::new(backend, &NoiseConfig::default());
        let mut volume = VolumeController::new(1.0);

        graph.open(volume.volume()).unwrap();
        volume.set_volume(0.25, &graph);
        assert_eq!(graph.session().unwrap().gain, 0.25);
    }
}
