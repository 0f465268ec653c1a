//! 32-bit mono PCM WAV files
//!
//! The filter operates on raw PCM words at the wire exponent, so only
//! 32-bit integer mono files are accepted; anything else is rejected at
//! startup rather than converted.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{FirError, Result};

/// Samples and sample rate of a mono PCM file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmWav {
    pub samples: Vec<i32>,
    pub sample_rate: u32,
}

/// Read a 32-bit integer mono WAV file
///
/// # Errors
/// Returns `FirError::InputFormat` if the file is not 32-bit integer mono,
/// `FirError::Wav` if it cannot be read.
pub fn load_pcm32_mono<P: AsRef<Path>>(path: P) -> Result<PcmWav> {
    let reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(FirError::InputFormat(format!(
            "expected mono WAV file, got {} channels",
            spec.channels
        )));
    }
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 32 {
        return Err(FirError::InputFormat(format!(
            "expected 32-bit integer PCM, got {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples = reader
        .into_samples::<i32>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    log::debug!(
        "Loaded {} samples at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.as_ref().display()
    );

    Ok(PcmWav {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write samples as a 32-bit integer mono WAV file
pub fn save_pcm32_mono<P: AsRef<Path>>(path: P, samples: &[i32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
