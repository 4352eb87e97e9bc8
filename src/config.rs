//! Engine configuration shared by the oscillator and the WAV writer.

use std::time::Duration;

use crate::error::{ToneError, ToneResult};
use crate::wav::WavFormat;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_AMPLITUDE: f32 = 0.5;
pub const DEFAULT_BUFFER_FRAMES: usize = 4096;
pub const DEFAULT_FREQUENCY: f32 = 100.0;
pub const DEFAULT_NOTE_DURATION_SECS: f32 = 0.5;

/// Rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Peak level of the sine, as a fraction of full scale.
    pub amplitude: f32,
    /// Frames per rendered buffer.
    pub buffer_frames: usize,
    /// Tone frequency used by the toggle modes.
    pub frequency: f32,
    /// Length of one note in note mode.
    pub note_duration_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            amplitude: DEFAULT_AMPLITUDE,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            frequency: DEFAULT_FREQUENCY,
            note_duration_secs: DEFAULT_NOTE_DURATION_SECS,
        }
    }
}

impl EngineConfig {
    /// Checks every field, returning the first violation.
    pub fn validate(&self) -> ToneResult<()> {
        if self.sample_rate == 0 {
            return Err(ToneError::InvalidSampleRate(self.sample_rate));
        }
        // Anything above 1.0 would overflow the 16-bit range after scaling.
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(ToneError::InvalidAmplitude(self.amplitude));
        }
        if self.buffer_frames == 0 {
            return Err(ToneError::InvalidBufferFrames(self.buffer_frames));
        }
        self.check_frequency(self.frequency)?;
        if !self.note_duration_secs.is_finite() || self.note_duration_secs <= 0.0 {
            return Err(ToneError::InvalidDuration(self.note_duration_secs));
        }
        Ok(())
    }

    /// Accepts any finite frequency above zero.
    pub fn check_frequency(&self, frequency: f32) -> ToneResult<()> {
        if frequency.is_finite() && frequency > 0.0 {
            Ok(())
        } else {
            Err(ToneError::InvalidFrequency(frequency))
        }
    }

    /// Wall-clock length of one buffer.
    pub fn buffer_duration(&self) -> Duration {
        Duration::from_secs_f64(self.buffer_frames as f64 / self.sample_rate as f64)
    }

    /// Frames in one fixed-duration note.
    pub fn note_frames(&self) -> usize {
        (self.sample_rate as f64 * self.note_duration_secs as f64).round() as usize
    }

    pub fn wav_format(&self) -> WavFormat {
        WavFormat::stereo(self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_frames, 4096);
        assert_eq!(config.note_frames(), 22050);
    }

    #[test]
    fn test_rejects_bad_amplitude() {
        let config = EngineConfig {
            amplitude: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ToneError::InvalidAmplitude(_))
        ));
    }

    #[test]
    fn test_rejects_zero_sample_rate_and_buffer() {
        let config = EngineConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ToneError::InvalidSampleRate(0))
        ));

        let config = EngineConfig {
            buffer_frames: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ToneError::InvalidBufferFrames(0))
        ));
    }

    #[test]
    fn test_frequency_bounds() {
        let config = EngineConfig::default();
        assert!(config.check_frequency(22050.0).is_ok());
        assert!(config.check_frequency(50000.0).is_ok());
        assert!(config.check_frequency(0.0).is_err());
        assert!(config.check_frequency(-440.0).is_err());
        assert!(config.check_frequency(f32::NAN).is_err());
        assert!(config.check_frequency(f32::INFINITY).is_err());
    }

    #[test]
    fn test_rejects_bad_note_duration() {
        let config = EngineConfig {
            note_duration_secs: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ToneError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_buffer_duration() {
        let config = EngineConfig {
            sample_rate: 1000,
            buffer_frames: 250,
            ..Default::default()
        };
        assert_eq!(config.buffer_duration(), Duration::from_millis(250));
    }
}
