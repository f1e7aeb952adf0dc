//! Audio output device access
//!
//! [`OutputBackend`] is the seam between the playback graph and the platform
//! audio stack. [`CpalBackend`] drives a real output device through cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::source::NoiseVoice;
use crate::error::AudioError;

/// A source of running output streams
pub trait OutputBackend {
    /// Handle keeping one output stream alive
    type Stream;

    /// Acquire the output device if not already held, returning its sample rate.
    ///
    /// Repeated calls reuse the held device. May block while the device warms up.
    fn ensure_ready(&mut self) -> Result<u32, AudioError>;

    /// Start an output stream rendering `voice`
    fn start(&mut self, voice: NoiseVoice) -> Result<Self::Stream, AudioError>;

    /// Stop and release a stream
    fn stop(&mut self, stream: Self::Stream);
}

struct ReadyDevice {
    device: cpal::Device,
    config: cpal::SupportedStreamConfig,
}

/// Output through the host's default output device
pub struct CpalBackend {
    host: cpal::Host,
    ready: Option<ReadyDevice>,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            ready: None,
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for CpalBackend {
    type Stream = cpal::Stream;

    fn ensure_ready(&mut self) -> Result<u32, AudioError> {
        if let Some(ready) = &self.ready {
            return Ok(ready.config.sample_rate().0);
        }

        let device = self
            .host
            .default_output_device()
            .ok_or_else(|| AudioError::DeviceUnavailable("No output device found".to_string()))?;

        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let config = device.default_output_config()?;

        log::info!("Using output device: {}", name);
        log::info!("Output config: {:?}", config);

        let sample_rate = config.sample_rate().0;
        self.ready = Some(ReadyDevice { device, config });
        Ok(sample_rate)
    }

    fn start(&mut self, voice: NoiseVoice) -> Result<cpal::Stream, AudioError> {
        let ready = self.ready.as_ref().ok_or_else(|| {
            AudioError::DeviceUnavailable("Output device not initialised".to_string())
        })?;

        let stream_config: cpal::StreamConfig = ready.config.config();
        let stream = match ready.config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&ready.device, &stream_config, voice),
            cpal::SampleFormat::I16 => build_stream::<i16>(&ready.device, &stream_config, voice),
            cpal::SampleFormat::U16 => build_stream::<u16>(&ready.device, &stream_config, voice),
            format => {
                return Err(AudioError::DeviceUnavailable(format!(
                    "Unsupported sample format: {:?}",
                    format
                )))
            }
        };

        let stream = release_on_error(&mut self.ready, stream)?;
        let played = stream.play();
        release_on_error(&mut self.ready, played)?;
        Ok(stream)
    }

    fn stop(&mut self, stream: cpal::Stream) {
        if let Err(e) = stream.pause() {
            log::warn!("Failed to pause output stream: {}", e);
        }
        drop(stream);
    }
}

/// Forget the held device when stream setup fails, so a stale device
/// (unplugged, reconfigured) is re-acquired on the next open.
fn release_on_error<D, T, E>(ready: &mut Option<D>, result: Result<T, E>) -> Result<T, AudioError>
where
    E: Into<AudioError>,
{
    result.map_err(|e| {
        *ready = None;
        e.into()
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut voice: NoiseVoice,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            voice.render(data, channels, |s| T::from_sample(s));
        },
        |err| log::error!("Audio output error: {}", err),
        None,
    )
}
