//! Error types for tone rendering and WAV writing.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type ToneResult<T> = Result<T, ToneError>;

/// Errors that can occur while rendering or writing a recording.
#[derive(Debug, Error)]
pub enum ToneError {
    /// The output sink could not be created.
    #[error("failed to open {} for writing: {source}", .path.display())]
    Setup {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying cause.
        source: std::io::Error,
    },

    /// I/O error while writing samples or patching the header.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("invalid amplitude: {0} (must be within 0.0..=1.0)")]
    InvalidAmplitude(f32),

    #[error("invalid buffer size: {0} frames")]
    InvalidBufferFrames(usize),

    #[error("invalid frequency: {0} Hz (must be finite and above 0)")]
    InvalidFrequency(f32),

    #[error("invalid duration: {0} seconds")]
    InvalidDuration(f32),

    /// Payload no longer fits the 32-bit RIFF size fields.
    #[error("WAV payload too large: {bytes} bytes")]
    DataTooLarge {
        /// Size the payload would have reached.
        bytes: u64,
    },

    #[error(transparent)]
    State(#[from] StateError),

    /// Reading a written file back failed.
    #[error("failed to inspect WAV file: {0}")]
    Inspect(#[from] hound::Error),
}

/// Misuse of the header-patching protocol.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("samples appended after the WAV header was finalized")]
    AppendAfterFinalize,

    #[error("WAV writer released before its header was finalized")]
    NotFinalized,
}
