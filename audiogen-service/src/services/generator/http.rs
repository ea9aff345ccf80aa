//! Remote inference backend.
//!
//! Posts the prompt to a model server and decodes the returned PCM.
//! Wire format:
//!
//! ```text
//! POST <endpoint>   {"text": "..."}
//! 200               {"sample_rate": 24000, "audio": "<base64 f32 little-endian>"}
//! ```
//!
//! Readiness is a `GET` on the health URL (the inference endpoint unless
//! configured otherwise). Any response below 500 counts as reachable, since a
//! POST-only route answers a `GET` with 405.

use super::{AudioGenerator, GeneratorError, Waveform};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpGenerator {
    endpoint: String,
    health_url: String,
    client: Client,
}

impl HttpGenerator {
    pub fn new(endpoint: String, timeout: Option<Duration>) -> Result<Self, GeneratorError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            GeneratorError::Unavailable(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            health_url: endpoint.clone(),
            endpoint,
            client,
        })
    }

    /// Probe `health_url` for readiness instead of the inference endpoint.
    pub fn with_health_url(mut self, health_url: String) -> Self {
        self.health_url = health_url;
        self
    }
}

#[async_trait]
impl AudioGenerator for HttpGenerator {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate(&self, text: &str) -> Result<Waveform, GeneratorError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            prompt_len = text.len(),
            "Sending request to inference server"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateAudioRequest { text })
            .send()
            .await
            .map_err(|e| GeneratorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Inference server returned error");
            return Err(GeneratorError::ModelError(format!("{}: {}", status, body)));
        }

        let payload: GenerateAudioResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidOutput(format!("Bad response body: {}", e)))?;

        payload.into_waveform()
    }

    async fn health_check(&self) -> Result<(), GeneratorError> {
        if self.health_url.is_empty() {
            return Err(GeneratorError::Unavailable(
                "Inference endpoint not configured".to_string(),
            ));
        }

        let response = self
            .client
            .get(&self.health_url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| GeneratorError::NetworkError(e.to_string()))?;

        if response.status().is_server_error() {
            Err(GeneratorError::Unavailable(format!(
                "Health check failed: {}",
                response.status()
            )))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateAudioRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateAudioResponse {
    sample_rate: u32,
    audio: String,
}

impl GenerateAudioResponse {
    fn into_waveform(self) -> Result<Waveform, GeneratorError> {
        if self.sample_rate == 0 {
            return Err(GeneratorError::InvalidOutput(
                "Sample rate must be positive".to_string(),
            ));
        }

        let bytes = STANDARD
            .decode(self.audio.as_bytes())
            .map_err(|e| GeneratorError::InvalidOutput(format!("Bad base64 audio: {}", e)))?;

        if bytes.len() % 4 != 0 {
            return Err(GeneratorError::InvalidOutput(format!(
                "PCM length {} is not a multiple of 4",
                bytes.len()
            )));
        }

        let samples = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Waveform::new(samples, self.sample_rate))
    }
}
