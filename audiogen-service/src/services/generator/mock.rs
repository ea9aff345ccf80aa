//! Mock generator for local development and tests.
//!
//! Renders one short sine tone per character of the prompt, so the output is
//! deterministic and its length depends on the text.

use super::{AudioGenerator, GeneratorError, Waveform};
use async_trait::async_trait;
use std::f32::consts::TAU;

/// Length of the tone rendered for each character.
const SEGMENT_SECS: f32 = 0.05;
const AMPLITUDE: f32 = 0.3;
const BASE_FREQ_HZ: f32 = 220.0;

pub struct MockGenerator {
    sample_rate: u32,
}

impl MockGenerator {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Number of samples the mock produces for `text`.
    pub fn expected_len(&self, text: &str) -> usize {
        text.chars().count() * self.segment_len()
    }

    fn segment_len(&self) -> usize {
        ((self.sample_rate as f32 * SEGMENT_SECS) as usize).max(1)
    }

    fn render(&self, text: &str) -> Vec<f32> {
        let segment_len = self.segment_len();
        let rate = self.sample_rate as f32;
        let mut samples = Vec::with_capacity(self.expected_len(text));

        for ch in text.chars() {
            // Map characters onto a two-octave semitone range above A3.
            let semitone = (ch as u32 % 24) as f32;
            let freq = BASE_FREQ_HZ * 2f32.powf(semitone / 12.0);
            samples.extend(
                (0..segment_len).map(|i| AMPLITUDE * (TAU * freq * i as f32 / rate).sin()),
            );
        }

        samples
    }
}

#[async_trait]
impl AudioGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, text: &str) -> Result<Waveform, GeneratorError> {
        if self.sample_rate == 0 {
            return Err(GeneratorError::Unavailable(
                "Mock generator sample rate is zero".to_string(),
            ));
        }

        Ok(Waveform::new(self.render(text), self.sample_rate))
    }

    async fn health_check(&self) -> Result<(), GeneratorError> {
        if self.sample_rate == 0 {
            Err(GeneratorError::Unavailable(
                "Mock generator sample rate is zero".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn output_is_deterministic_and_scales_with_text() {
        let generator = MockGenerator::new(24_000);

        let a = generator.generate("hello").await.unwrap();
        let b = generator.generate("hello").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.samples.len(), 5 * 1200);
        assert_eq!(a.samples.len(), generator.expected_len("hello"));

        let longer = generator.generate("hello world").await.unwrap();
        assert!(longer.samples.len() > a.samples.len());
    }

    #[tokio::test]
    async fn samples_stay_within_amplitude() {
        let waveform = MockGenerator::new(8_000).generate("♪ la la").await.unwrap();
        assert!(!waveform.samples.is_empty());
        assert!(waveform.samples.iter().all(|s| s.abs() <= AMPLITUDE + f32::EPSILON));
    }

    #[tokio::test]
    async fn zero_sample_rate_is_unavailable() {
        let generator = MockGenerator::new(0);
        assert!(generator.health_check().await.is_err());
        assert!(matches!(
            generator.generate("x").await,
            Err(GeneratorError::Unavailable(_))
        ));
    }
}
