//! Phase-accumulator sine oscillator rendering interleaved stereo PCM.

use std::f32::consts::TAU;

use crate::config::EngineConfig;
use crate::error::ToneResult;

/// Interleaved stereo 16-bit samples: `[L0, R0, L1, R1, ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleBatch(Vec<i16>);

impl SampleBatch {
    pub fn frames(&self) -> usize {
        self.0.len() / 2
    }

    pub fn samples(&self) -> &[i16] {
        &self.0
    }

    /// Size of the batch once written as PCM.
    pub fn byte_len(&self) -> usize {
        self.0.len() * std::mem::size_of::<i16>()
    }

    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|&s| s == 0)
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.0
    }
}

impl From<Vec<i16>> for SampleBatch {
    fn from(samples: Vec<i16>) -> Self {
        Self(samples)
    }
}

/// Scales a float sample to 16-bit PCM, truncating toward zero.
///
/// No clamping happens here; the amplitude bound in [`EngineConfig`]
/// keeps the product inside the `i16` range.
fn quantize(sample: f32) -> i16 {
    (sample * i16::MAX as f32) as i16
}

/// Sine oscillator with a bounded phase accumulator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    config: EngineConfig,
    phase: f32,
    frequency: f32,
    active: bool,
}

impl Oscillator {
    /// Creates a silent oscillator at phase 0 tuned to `config.frequency`.
    pub fn new(config: &EngineConfig) -> ToneResult<Self> {
        config.validate()?;
        Ok(Self {
            config: *config,
            phase: 0.0,
            frequency: config.frequency,
            active: false,
        })
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Flips between sounding and silent. Phase is left untouched, so a
    /// resumed tone continues from wherever it was paused.
    pub fn toggle(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn set_frequency(&mut self, frequency: f32) -> ToneResult<()> {
        self.config.check_frequency(frequency)?;
        self.frequency = frequency;
        Ok(())
    }

    /// Phase increment per frame, in radians, reduced modulo 2π.
    ///
    /// Frequencies at or above the sample rate alias onto a step in [0, 2π),
    /// which keeps a single wrap per frame enough to bound the phase.
    pub fn phase_step(&self) -> f32 {
        (TAU * self.frequency / self.config.sample_rate as f32) % TAU
    }

    /// Renders `frames` stereo frames.
    ///
    /// While inactive every sample is zero and the phase does not move.
    pub fn render(&mut self, frames: usize) -> SampleBatch {
        let mut samples = Vec::with_capacity(frames * 2);
        let step = self.phase_step();

        for _ in 0..frames {
            if self.active {
                let value = quantize(self.config.amplitude * self.phase.sin());
                samples.push(value); // Left channel
                samples.push(value); // Right channel

                self.phase += step;
                if self.phase >= TAU {
                    self.phase -= TAU;
                }
            } else {
                samples.push(0);
                samples.push(0);
            }
        }

        SampleBatch(samples)
    }

    /// Starts a fixed-duration note at `frequency`.
    ///
    /// The returned iterator yields buffers of `buffer_frames` frames, with a
    /// shorter final buffer holding exactly the remainder.
    pub fn render_note(&mut self, frequency: f32) -> ToneResult<NoteBatches<'_>> {
        self.set_frequency(frequency)?;
        self.active = true;
        let remaining = self.config.note_frames();
        let buffer_frames = self.config.buffer_frames;
        Ok(NoteBatches {
            oscillator: self,
            remaining,
            buffer_frames,
        })
    }
}

/// Buffers of one fixed-duration note, see [`Oscillator::render_note`].
#[derive(Debug)]
pub struct NoteBatches<'a> {
    oscillator: &'a mut Oscillator,
    remaining: usize,
    buffer_frames: usize,
}

impl NoteBatches<'_> {
    /// Frames not yet rendered.
    pub fn remaining_frames(&self) -> usize {
        self.remaining
    }
}

impl Iterator for NoteBatches<'_> {
    type Item = SampleBatch;

    fn next(&mut self) -> Option<SampleBatch> {
        if self.remaining == 0 {
            return None;
        }
        let frames = self.remaining.min(self.buffer_frames);
        self.remaining -= frames;
        Some(self.oscillator.render(frames))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let batches = self.remaining.div_ceil(self.buffer_frames);
        (batches, Some(batches))
    }
}

impl ExactSizeIterator for NoteBatches<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_oscillator(frequency: f32) -> Oscillator {
        let config = EngineConfig {
            frequency,
            ..Default::default()
        };
        let mut osc = Oscillator::new(&config).unwrap();
        osc.set_active(true);
        osc
    }

    #[test]
    fn test_quantize_truncates() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16383);
        assert_eq!(quantize(1.0), 32767);
    }

    #[test]
    fn test_render_length_and_interleaving() {
        let mut osc = active_oscillator(440.0);
        let batch = osc.render(128);

        assert_eq!(batch.frames(), 128);
        assert_eq!(batch.samples().len(), 256);
        assert_eq!(batch.byte_len(), 512);
        for frame in batch.samples().chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_first_sample_is_zero_crossing() {
        let mut osc = active_oscillator(440.0);
        let batch = osc.render(2);
        assert_eq!(batch.samples()[0], 0);
        assert!(batch.samples()[2] > 0);
    }

    #[test]
    fn test_phase_advances_per_frame() {
        let mut osc = active_oscillator(1000.0);
        let step = osc.phase_step();
        osc.render(1);
        assert!((osc.phase() - step).abs() < 1e-6);
        osc.render(3);
        assert!((osc.phase() - 4.0 * step).abs() < 1e-5);
    }

    #[test]
    fn test_phase_stays_bounded() {
        for frequency in [1.0, 261.63, 440.0, 9999.0, 22050.0, 30000.0, 50000.0, 1.0e9] {
            let mut osc = active_oscillator(frequency);
            osc.render(10_000);
            assert!(
                (0.0..TAU).contains(&osc.phase()),
                "phase {} out of range at {frequency} Hz",
                osc.phase()
            );
        }
    }

    #[test]
    fn test_inactive_render_is_silent_and_keeps_phase() {
        let mut osc = active_oscillator(440.0);
        osc.render(100);
        let before = osc.phase();

        osc.set_active(false);
        let batch = osc.render(4096);

        assert_eq!(batch.samples().len(), 8192);
        assert!(batch.is_silent());
        assert_eq!(osc.phase(), before);
    }

    #[test]
    fn test_toggle_resumes_from_frozen_phase() {
        let mut osc = active_oscillator(440.0);
        osc.render(37);
        let frozen = osc.phase();

        assert!(!osc.toggle());
        osc.render(512);
        assert!(osc.toggle());
        assert_eq!(osc.phase(), frozen);
    }

    #[test]
    fn test_amplitude_bound() {
        let mut osc = active_oscillator(440.0);
        let batch = osc.render(44100);
        let peak = batch.samples().iter().map(|s| s.unsigned_abs()).max();
        assert!(peak.unwrap() <= 16384);
        assert!(peak.unwrap() > 16000);
    }

    #[test]
    fn test_set_frequency_rejects_invalid() {
        let mut osc = active_oscillator(440.0);
        assert!(osc.set_frequency(-1.0).is_err());
        assert!(osc.set_frequency(f32::NAN).is_err());
        assert_eq!(osc.frequency(), 440.0);
    }

    #[test]
    fn test_frequencies_above_half_rate_render() {
        let mut osc = active_oscillator(30000.0);
        let step = osc.phase_step();
        assert!((step - TAU * 30000.0 / 44100.0).abs() < 1e-5);
        let batch = osc.render(1);
        assert_eq!(batch.samples().len(), 2);
        assert!((osc.phase() - step).abs() < 1e-6);

        osc.set_frequency(50000.0).unwrap();
        let step = osc.phase_step();
        assert!((step - (TAU * 50000.0 / 44100.0 - TAU)).abs() < 1e-5);
        let before = osc.phase();
        osc.render(1);
        let advanced = (osc.phase() - before).rem_euclid(TAU);
        assert!((advanced - step).abs() < 1e-5);
        assert!((0.0..TAU).contains(&osc.phase()));
    }

    #[test]
    fn test_note_batches_exact_chunking() {
        let mut osc = Oscillator::new(&EngineConfig::default()).unwrap();
        let batches: Vec<SampleBatch> = osc.render_note(261.63).unwrap().collect();

        assert_eq!(batches.len(), 6);
        for batch in &batches[..5] {
            assert_eq!(batch.frames(), 4096);
        }
        assert_eq!(batches[5].frames(), 22050 % 4096);
        let total: usize = batches.iter().map(SampleBatch::frames).sum();
        assert_eq!(total, 22050);
        assert!(osc.is_active());
    }

    #[test]
    fn test_note_batches_size_hint() {
        let mut osc = Oscillator::new(&EngineConfig::default()).unwrap();
        let mut note = osc.render_note(440.0).unwrap();
        assert_eq!(note.len(), 6);
        note.next();
        assert_eq!(note.len(), 5);
        assert_eq!(note.remaining_frames(), 22050 - 4096);
    }
}
