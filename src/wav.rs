//! Canonical 44-byte PCM WAV container writer.
//!
//! The header is written up front with zeroed size fields. Once the payload
//! is complete, [`finalize`] seeks back and patches the RIFF chunk size and
//! the data chunk size. Sinks that cannot seek go through [`encode_wav`],
//! which buffers the payload and emits the header with final sizes.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, warn};

use crate::error::{StateError, ToneError, ToneResult};
use crate::oscillator::SampleBatch;

/// Length of the canonical PCM header.
pub const HEADER_LEN: u64 = 44;

/// Header bytes counted by the RIFF chunk size (everything after offset 8).
const RIFF_OVERHEAD: u32 = 36;
const RIFF_SIZE_OFFSET: u64 = 4;
const DATA_SIZE_OFFSET: u64 = 40;

/// Largest payload whose RIFF chunk size still fits in 32 bits.
pub const MAX_DATA_BYTES: u32 = u32::MAX - RIFF_OVERHEAD;

/// WAV file format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Number of channels (2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (always 16 here).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Creates a 16-bit stereo format.
    pub fn stereo(sample_rate: u32) -> Self {
        Self {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
        }
    }

    fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per sample frame.
    pub fn block_align(&self) -> u16 {
        self.channels * self.bytes_per_sample()
    }

    /// Bytes per second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

fn write_chunks<W: Write>(
    sink: &mut W,
    format: &WavFormat,
    riff_size: u32,
    data_bytes: u32,
) -> io::Result<()> {
    // RIFF header
    sink.write_all(b"RIFF")?;
    sink.write_all(&riff_size.to_le_bytes())?;
    sink.write_all(b"WAVE")?;

    // fmt chunk
    sink.write_all(b"fmt ")?;
    sink.write_all(&16u32.to_le_bytes())?; // Chunk size (16 for PCM)
    sink.write_all(&1u16.to_le_bytes())?; // Audio format (1 = PCM)
    sink.write_all(&format.channels.to_le_bytes())?;
    sink.write_all(&format.sample_rate.to_le_bytes())?;
    sink.write_all(&format.byte_rate().to_le_bytes())?;
    sink.write_all(&format.block_align().to_le_bytes())?;
    sink.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    sink.write_all(b"data")?;
    sink.write_all(&data_bytes.to_le_bytes())?;
    Ok(())
}

/// Writes the 44-byte header with both size fields set to zero.
pub fn write_header<W: Write>(sink: &mut W, format: &WavFormat) -> io::Result<()> {
    write_chunks(sink, format, 0, 0)
}

/// Writes a batch as little-endian 16-bit samples, returning the bytes written.
pub fn append_samples<W: Write>(sink: &mut W, batch: &SampleBatch) -> io::Result<usize> {
    let mut pcm = Vec::with_capacity(batch.byte_len());
    for sample in batch.samples() {
        pcm.extend_from_slice(&sample.to_le_bytes());
    }
    sink.write_all(&pcm)?;
    Ok(pcm.len())
}

/// Patches the data chunk size and RIFF chunk size for `data_bytes` of payload.
///
/// Calling this again overwrites the previous values. The stream position is
/// left at the end of the sink.
pub fn finalize<W: Write + Seek>(sink: &mut W, data_bytes: u32) -> ToneResult<()> {
    let riff_size = data_bytes
        .checked_add(RIFF_OVERHEAD)
        .ok_or(ToneError::DataTooLarge {
            bytes: data_bytes as u64,
        })?;

    sink.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
    sink.write_all(&data_bytes.to_le_bytes())?;
    sink.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
    sink.write_all(&riff_size.to_le_bytes())?;
    sink.seek(SeekFrom::End(0))?;
    sink.flush()?;
    Ok(())
}

/// Encodes a complete WAV file in memory for sinks that cannot seek.
pub fn encode_wav(format: &WavFormat, samples: &[i16]) -> ToneResult<Vec<u8>> {
    let bytes = samples.len() as u64 * 2;
    let data_bytes = u32::try_from(bytes)
        .ok()
        .filter(|&b| b <= MAX_DATA_BYTES)
        .ok_or(ToneError::DataTooLarge { bytes })?;

    let mut buffer = Vec::with_capacity(HEADER_LEN as usize + bytes as usize);
    write_chunks(&mut buffer, format, RIFF_OVERHEAD + data_bytes, data_bytes)?;
    for sample in samples {
        buffer.extend_from_slice(&sample.to_le_bytes());
    }
    Ok(buffer)
}

/// Owns a seekable sink and enforces header-then-samples-then-finalize.
#[derive(Debug)]
pub struct WavWriter<W: Write + Seek> {
    sink: Option<W>,
    format: WavFormat,
    data_bytes: u32,
    finalized: bool,
}

impl WavWriter<BufWriter<File>> {
    /// Creates `path` and writes the placeholder header.
    pub fn create(path: impl AsRef<Path>, format: WavFormat) -> ToneResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ToneError::Setup {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("opened {} for writing", path.display());
        Self::new(BufWriter::new(file), format)
    }
}

impl<W: Write + Seek> WavWriter<W> {
    /// Wraps `sink` and writes the placeholder header to it.
    pub fn new(mut sink: W, format: WavFormat) -> ToneResult<Self> {
        write_header(&mut sink, &format)?;
        Ok(Self {
            sink: Some(sink),
            format,
            data_bytes: 0,
            finalized: false,
        })
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    /// Payload bytes appended so far.
    pub fn data_bytes(&self) -> u32 {
        self.data_bytes
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn sink_mut(&mut self) -> &mut W {
        // Only `into_inner` takes the sink, and it consumes `self`.
        self.sink.as_mut().expect("sink present until into_inner")
    }

    /// Appends one batch of interleaved samples.
    pub fn append_samples(&mut self, batch: &SampleBatch) -> ToneResult<()> {
        if self.finalized {
            return Err(StateError::AppendAfterFinalize.into());
        }
        let total = self.data_bytes as u64 + batch.byte_len() as u64;
        if total > MAX_DATA_BYTES as u64 {
            return Err(ToneError::DataTooLarge { bytes: total });
        }

        let written = append_samples(self.sink_mut(), batch)?;
        self.data_bytes += written as u32;
        Ok(())
    }

    /// Patches the header with the number of bytes appended.
    pub fn finalize(&mut self) -> ToneResult<()> {
        self.finalize_with(self.data_bytes)
    }

    /// Patches the header with an explicit payload size. The last call wins.
    pub fn finalize_with(&mut self, data_bytes: u32) -> ToneResult<()> {
        finalize(self.sink_mut(), data_bytes)?;
        self.finalized = true;
        debug!("patched WAV header for {} data bytes", data_bytes);
        Ok(())
    }

    /// Releases the sink. Fails if the header was never finalized.
    pub fn into_inner(mut self) -> ToneResult<W> {
        if !self.finalized {
            return Err(StateError::NotFinalized.into());
        }
        Ok(self.sink.take().expect("sink present until into_inner"))
    }
}

impl<W: Write + Seek> Drop for WavWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_some() && !self.finalized {
            warn!(
                "WAV writer dropped without finalize; header sizes left at zero ({} data bytes)",
                self.data_bytes
            );
        }
    }
}

/// Properties of a WAV file read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WavSummary {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Frames per channel.
    pub frames: u32,
    pub duration_secs: f32,
    /// Whether the declared data size accounts for every byte after the header.
    pub header_matches_payload: bool,
}

/// Reads `path` back and reports what its header declares.
pub fn inspect(path: impl AsRef<Path>) -> ToneResult<WavSummary> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.duration();

    let declared = reader.len() as u64 * (spec.bits_per_sample as u64 / 8);
    let file_len = std::fs::metadata(path)?.len();

    Ok(WavSummary {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        frames,
        duration_secs: frames as f32 / spec.sample_rate as f32,
        header_matches_payload: file_len == HEADER_LEN + declared,
    })
}
