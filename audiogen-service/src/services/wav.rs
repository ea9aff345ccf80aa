use crate::services::generator::Waveform;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("Invalid waveform: {0}")]
    InvalidWaveform(String),

    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),

    #[error("WAV writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Write `waveform` as mono 32-bit float WAV at `path`.
///
/// Encoding runs on the blocking pool.
pub async fn write_wav(path: impl Into<PathBuf>, waveform: Waveform) -> Result<(), WavError> {
    if waveform.sample_rate == 0 {
        return Err(WavError::InvalidWaveform(
            "sample rate must be positive".to_string(),
        ));
    }

    let path = path.into();
    tokio::task::spawn_blocking(move || encode(&path, &waveform)).await??;
    Ok(())
}

fn encode(path: &Path, waveform: &Waveform) -> Result<(), WavError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &waveform.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
