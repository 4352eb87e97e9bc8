//! Recording session: feeds triggers to the oscillator and streams the
//! rendered buffers into a WAV writer.
//!
//! The toggle, note-select and polled variants all run through the same
//! [`Session`]; they differ only in which [`TriggerSource`] drives it.

use std::io::{Seek, Write};

use log::{debug, info};

use crate::config::EngineConfig;
use crate::error::ToneResult;
use crate::oscillator::Oscillator;
use crate::wav::WavWriter;

/// Input event handled by a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// Flip the tone on or off, then render one buffer.
    Toggle,
    /// Play a fixed-duration note at the given frequency.
    Note(f32),
    /// Render one buffer in the current state.
    Tick,
    Quit,
}

/// Produces the triggers that drive a session.
pub trait TriggerSource {
    fn next_trigger(&mut self) -> ToneResult<Trigger>;
}

/// Replays a fixed sequence of triggers, then quits.
#[derive(Debug)]
pub struct Scripted<I>(I);

impl<I: Iterator<Item = Trigger>> Scripted<I> {
    pub fn new(triggers: impl IntoIterator<IntoIter = I>) -> Self {
        Self(triggers.into_iter())
    }
}

impl<I: Iterator<Item = Trigger>> TriggerSource for Scripted<I> {
    fn next_trigger(&mut self) -> ToneResult<Trigger> {
        Ok(self.0.next().unwrap_or(Trigger::Quit))
    }
}

/// Totals reported when a session finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub data_bytes: u32,
    pub triggers: u64,
}

/// Result of handling one trigger: keep pulling triggers, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Owns the oscillator and the WAV writer for one recording.
///
/// Every trigger renders straight into the writer, and the running frame
/// count is kept for the summary. [`Session::finish`] patches the header.
pub struct Session<W: Write + Seek> {
    config: EngineConfig,
    oscillator: Oscillator,
    writer: WavWriter<W>,
    frames: u64,
    triggers: u64,
}

impl<W: Write + Seek> Session<W> {
    pub fn new(config: &EngineConfig, writer: WavWriter<W>) -> ToneResult<Self> {
        Ok(Self {
            config: *config,
            oscillator: Oscillator::new(config)?,
            writer,
            frames: 0,
            triggers: 0,
        })
    }

    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    fn render_buffer(&mut self) -> ToneResult<()> {
        let batch = self.oscillator.render(self.config.buffer_frames);
        self.writer.append_samples(&batch)?;
        self.frames += batch.frames() as u64;
        Ok(())
    }

    fn render_note(&mut self, frequency: f32) -> ToneResult<()> {
        for batch in self.oscillator.render_note(frequency)? {
            self.writer.append_samples(&batch)?;
            self.frames += batch.frames() as u64;
        }
        Ok(())
    }

    /// Applies one trigger.
    pub fn handle(&mut self, trigger: Trigger) -> ToneResult<Flow> {
        self.triggers += 1;
        debug!("trigger {:?} at frame {}", trigger, self.frames);

        match trigger {
            Trigger::Toggle => {
                let active = self.oscillator.toggle();
                debug!("tone {}", if active { "on" } else { "off" });
                self.render_buffer()?;
            }
            Trigger::Note(frequency) => self.render_note(frequency)?,
            Trigger::Tick => self.render_buffer()?,
            Trigger::Quit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    /// Pulls triggers from `source` until it yields [`Trigger::Quit`].
    pub fn run(&mut self, source: &mut dyn TriggerSource) -> ToneResult<()> {
        while self.handle(source.next_trigger()?)? == Flow::Continue {}
        Ok(())
    }

    /// Patches the WAV header and hands back the sink.
    pub fn finish(mut self) -> ToneResult<(SessionSummary, W)> {
        self.writer.finalize()?;
        let summary = SessionSummary {
            frames: self.frames,
            data_bytes: self.writer.data_bytes(),
            triggers: self.triggers,
        };
        info!(
            "recorded {} frames ({} data bytes) from {} triggers",
            summary.frames, summary.data_bytes, summary.triggers
        );
        Ok((summary, self.writer.into_inner()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(config: &EngineConfig) -> Session<Cursor<Vec<u8>>> {
        let writer = WavWriter::new(Cursor::new(Vec::new()), config.wav_format()).unwrap();
        Session::new(config, writer).unwrap()
    }

    #[test]
    fn test_scripted_source_quits_when_exhausted() {
        let mut source = Scripted::new([Trigger::Tick]);
        assert_eq!(source.next_trigger().unwrap(), Trigger::Tick);
        assert_eq!(source.next_trigger().unwrap(), Trigger::Quit);
        assert_eq!(source.next_trigger().unwrap(), Trigger::Quit);
    }

    #[test]
    fn test_toggle_renders_one_buffer() {
        let config = EngineConfig::default();
        let mut session = session(&config);

        assert_eq!(session.handle(Trigger::Toggle).unwrap(), Flow::Continue);
        assert!(session.oscillator().is_active());
        assert_eq!(session.frames_written(), 4096);
    }

    #[test]
    fn test_quit_stops_without_rendering() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        assert_eq!(session.handle(Trigger::Quit).unwrap(), Flow::Stop);
        assert_eq!(session.frames_written(), 0);
    }

    #[test]
    fn test_run_and_finish() {
        let config = EngineConfig {
            buffer_frames: 64,
            ..Default::default()
        };
        let mut session = session(&config);
        let mut source = Scripted::new([Trigger::Tick, Trigger::Toggle, Trigger::Tick]);
        session.run(&mut source).unwrap();

        let (summary, sink) = session.finish().unwrap();
        assert_eq!(summary.frames, 192);
        assert_eq!(summary.data_bytes, 192 * 4);
        assert_eq!(summary.triggers, 4);
        assert_eq!(sink.into_inner().len(), 44 + 192 * 4);
    }

    struct FailingKeys;

    impl TriggerSource for FailingKeys {
        fn next_trigger(&mut self) -> ToneResult<Trigger> {
            Err(std::io::Error::new(std::io::ErrorKind::NotConnected, "no keyboard").into())
        }
    }

    #[test]
    fn test_finish_after_source_error() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        session.handle(Trigger::Toggle).unwrap();

        assert!(session.run(&mut FailingKeys).is_err());
        let (summary, sink) = session.finish().unwrap();
        let bytes = sink.into_inner();
        assert_eq!(summary.data_bytes, 4096 * 4);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 4096 * 4);
    }

    #[test]
    fn test_invalid_note_is_reported() {
        let config = EngineConfig::default();
        let mut session = session(&config);
        assert!(session.handle(Trigger::Note(-5.0)).is_err());
        assert_eq!(session.frames_written(), 0);
    }
}
