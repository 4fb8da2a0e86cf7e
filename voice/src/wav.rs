//! WAV encode/decode at the waveform boundary.
//!
//! The scrambler itself only sees sample buffers; these helpers cover the
//! common case of reading an extracted audio track from disk and writing
//! the de-identified result back as 16-bit mono PCM.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::VoiceError;

/// Reads a 16-bit integer PCM WAV file.
///
/// Returns the sample rate, the interleaved samples, and the channel
/// count, ready to hand to [`crate::VoiceScrambler::scramble`]. Float and
/// non-16-bit files are rejected rather than silently converted.
pub fn read_samples(path: impl AsRef<Path>) -> Result<(u32, Vec<i16>, u16), VoiceError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(VoiceError::UnsupportedFormat(format!(
            "{}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok((spec.sample_rate, samples, spec.channels))
}

/// Writes mono 16-bit PCM samples as a WAV file.
pub fn write_mono(
    path: impl AsRef<Path>,
    sample_rate: u32,
    samples: &[i16],
) -> Result<(), VoiceError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
