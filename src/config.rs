use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::NoiseParams;

/// Longest noise buffer accepted, in seconds
pub const MAX_DURATION_SECS: f32 = 300.0;

/// Errors that can occur while loading a [`NoiseConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunable sound-character settings.
///
/// Read from JSON. Fields use `#[serde(default)]` so a file only needs
/// to name the values it overrides. Nothing is ever written back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Length of the looped noise buffer
    pub duration_secs: f32,

    /// Leaky integrator step applied to each white-noise draw
    pub integrator_step: f32,

    /// Makeup gain applied to the integrated signal
    pub makeup_gain: f32,

    /// Volume fraction in effect before the caller sets one
    pub initial_volume: f32,

    /// Length of the gain ramp on volume changes; 0 snaps instantly
    pub gain_ramp_ms: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        let params = NoiseParams::default();
        Self {
            duration_secs: 2.0,
            integrator_step: params.step,
            makeup_gain: params.makeup_gain,
            initial_volume: 0.5,
            gain_ramp_ms: 20.0,
        }
    }
}

impl NoiseConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator or the gain ramp cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "duration_secs must be positive, got {}",
                self.duration_secs
            )));
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "duration_secs must be at most {}, got {}",
                MAX_DURATION_SECS, self.duration_secs
            )));
        }
        if !self.integrator_step.is_finite() || self.integrator_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "integrator_step must be positive, got {}",
                self.integrator_step
            )));
        }
        if !self.makeup_gain.is_finite() || self.makeup_gain < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "makeup_gain must be non-negative, got {}",
                self.makeup_gain
            )));
        }
        if !self.gain_ramp_ms.is_finite() || self.gain_ramp_ms < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gain_ramp_ms must be non-negative, got {}",
                self.gain_ramp_ms
            )));
        }
        if !self.initial_volume.is_finite() {
            return Err(ConfigError::Invalid("initial_volume must be finite".to_string()));
        }
        Ok(())
    }

    pub fn noise_params(&self) -> NoiseParams {
        NoiseParams {
            step: self.integrator_step,
            makeup_gain: self.makeup_gain,
        }
    }

    /// Initial volume, clamped into [0, 1]
    pub fn initial_volume(&self) -> f32 {
        self.initial_volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NoiseConfig::default();
        assert_eq!(config.duration_secs, 2.0);
        assert_eq!(config.integrator_step, 0.02);
        assert_eq!(config.makeup_gain, 3.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = NoiseConfig::from_json_str(r#"{ "makeup_gain": 2.0 }"#).unwrap();
        assert_eq!(config.makeup_gain, 2.0);
        assert_eq!(config.duration_secs, 2.0);
        assert_eq!(config.gain_ramp_ms, 20.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            NoiseConfig::from_json_str(r#"{ "duration_secs": 0.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            NoiseConfig::from_json_str(r#"{ "integrator_step": -0.1 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            NoiseConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_duration() {
        assert!(matches!(
            NoiseConfig::from_json_str(r#"{ "duration_secs": 1e12 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(NoiseConfig::from_json_str(r#"{ "duration_secs": 300.0 }"#).is_ok());
    }

    #[test]
    fn test_initial_volume_clamped() {
        let config = NoiseConfig::from_json_str(r#"{ "initial_volume": 1.7 }"#).unwrap();
        assert_eq!(config.initial_volume(), 1.0);
    }

    #[test]
    fn test_load_missing_file() {
        let result = NoiseConfig::load("/nonexistent/brown-noise.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
