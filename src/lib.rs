//! Sine tone synthesis to 16-bit stereo PCM WAV files.
//!
//! An [`Oscillator`] renders interleaved sample batches, a [`WavWriter`]
//! streams them to disk and patches the header sizes at the end, and a
//! [`Session`] drives both from keyboard triggers.

pub mod config;
pub mod error;
pub mod keyboard;
pub mod notes;
pub mod oscillator;
pub mod session;
pub mod wav;

pub use config::EngineConfig;
pub use error::{StateError, ToneError, ToneResult};
pub use oscillator::{Oscillator, SampleBatch};
pub use session::{Session, SessionSummary, Trigger, TriggerSource};
pub use wav::{WavFormat, WavWriter};
