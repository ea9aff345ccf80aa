//! Text-to-audio generator abstractions and implementations.
//!
//! The model itself runs outside this process. This module provides a
//! trait-based seam so the request flow is independent of where the
//! waveform comes from (remote inference server or the mock backend).

pub mod http;
pub mod mock;

pub use http::HttpGenerator;
pub use mock::MockGenerator;

use crate::config::{GeneratorBackend, GeneratorConfig};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error type for generator operations.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Generator not available: {0}")]
    Unavailable(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Mono audio produced by a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Trait for text-to-audio generation backends.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    /// Short backend name used in logs, metrics and the health endpoint.
    fn name(&self) -> &'static str;

    /// Generate a waveform for the given prompt.
    async fn generate(&self, text: &str) -> Result<Waveform, GeneratorError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), GeneratorError>;
}

/// Build the generator selected by configuration.
pub fn from_config(config: &GeneratorConfig) -> Result<Arc<dyn AudioGenerator>, GeneratorError> {
    let generator: Arc<dyn AudioGenerator> = match config.backend {
        GeneratorBackend::Http => {
            let mut generator = HttpGenerator::new(config.endpoint.clone(), config.timeout())?;
            if let Some(health_url) = &config.health_url {
                generator = generator.with_health_url(health_url.clone());
            }
            Arc::new(generator)
        }
        GeneratorBackend::Mock => Arc::new(MockGenerator::new(config.sample_rate)),
    };
    Ok(generator)
}
