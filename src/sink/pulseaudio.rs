//! PulseAudio playback backend
//!
//! Uses the blocking "simple" API: `write` returns once the server has
//! accepted the buffer, so backpressure comes from PulseAudio itself.
//!
//! Dependencies:
//! - PulseAudio client libraries (`libpulse`, `libpulse-simple`)
//! - A running server (or `PULSE_SERVER` pointing at one)

use super::device::{DeviceFormat, PlaybackDevice};
use super::SampleFormat;
use crate::{PiperError, Result};
use libpulse_binding::sample::{Format, Spec};
use libpulse_binding::stream::Direction;
use libpulse_simple_binding::Simple;
use log::debug;

/// PulseAudio playback stream
pub struct PulseDevice {
    simple: Option<Simple>,
}

impl PulseDevice {
    pub fn new() -> Self {
        Self { simple: None }
    }

    fn stream(&self) -> Result<&Simple> {
        self.simple
            .as_ref()
            .ok_or_else(|| PiperError::Device("PulseAudio stream is not open".to_string()))
    }
}

impl Default for PulseDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackDevice for PulseDevice {
    fn open(&mut self, format: &DeviceFormat) -> Result<()> {
        let sample_format = match format.sample_format {
            SampleFormat::S16Le => Format::S16le,
            SampleFormat::F32Le => Format::F32le,
        };
        let spec = Spec {
            format: sample_format,
            channels: format.channels,
            rate: format.sample_rate,
        };
        if !spec.is_valid() {
            return Err(PiperError::Device(format!("invalid sample spec {:?}", format)));
        }

        let simple = Simple::new(
            None,
            crate::APP_NAME,
            Direction::Playback,
            None,
            "text-to-speech",
            &spec,
            None,
            None,
        )
        .map_err(|e| PiperError::Device(format!("failed to open device because {}", e)))?;

        debug!("PulseAudio stream connected");
        self.simple = Some(simple);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream()?
            .write(bytes)
            .map_err(|e| PiperError::Device(format!("failed to play audio because {}", e)))
    }

    fn drain(&mut self) -> Result<()> {
        self.stream()?
            .drain()
            .map_err(|e| {
                PiperError::Device(format!("failed to wait for audio to play because {}", e))
            })
    }

    fn close(&mut self) {
        if self.simple.take().is_some() {
            debug!("PulseAudio stream released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_before_open() {
        let mut device = PulseDevice::new();
        device.close();
        device.close();
        assert!(device.simple.is_none());
    }

    #[test]
    fn test_unopened_stream_rejects_io() {
        let mut device = PulseDevice::default();
        assert!(matches!(device.write(&[0, 0]), Err(PiperError::Device(_))));
        assert!(matches!(device.drain(), Err(PiperError::Device(_))));
    }
}
