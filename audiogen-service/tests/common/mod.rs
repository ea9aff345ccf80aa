#![allow(dead_code)]

use async_trait::async_trait;
use audiogen_service::config::{
    AudiogenConfig, GeneratorBackend, GeneratorConfig, OutputConfig, S3Config, DEFAULT_SAMPLE_RATE,
};
use audiogen_service::services::{
    AudioGenerator, GeneratorError, MockGenerator, ObjectStore, StorageError, Waveform,
};
use audiogen_service::startup::{Application, Uploader};
use service_core::config::Config as CoreConfig;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "test-bucket";
pub const TEST_PREFIX: &str = "bark-outputs";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub output_dir: PathBuf,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn with the mock generator and no uploader.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MockGenerator::new(DEFAULT_SAMPLE_RATE)), None).await
    }

    pub async fn spawn_with(
        generator: Arc<dyn AudioGenerator>,
        uploader: Option<Uploader>,
    ) -> Self {
        let output_dir = PathBuf::from(format!("target/test-outputs-{}", Uuid::new_v4()));
        let config = test_config(&output_dir);

        let app = Application::build_with(config, generator, uploader)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            output_dir,
            client,
        }
    }

    pub async fn post_generate(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/generate", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_download(&self, filename: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/download/{}", self.address, filename))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Names of files currently in the output directory.
    pub fn output_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.output_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.output_dir).await;
    }
}

pub fn test_config(output_dir: &Path) -> AudiogenConfig {
    AudiogenConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "info".to_string(),
        },
        output: OutputConfig {
            dir: output_dir.display().to_string(),
        },
        generator: GeneratorConfig {
            backend: GeneratorBackend::Mock,
            endpoint: String::new(),
            health_url: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            timeout_secs: None,
        },
        s3: S3Config {
            bucket: None,
            region: "us-east-1".to_string(),
            key_prefix: TEST_PREFIX.to_string(),
        },
    }
}

/// Generator that always fails, standing in for a crashed model.
pub struct FailingGenerator;

#[async_trait]
impl AudioGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _text: &str) -> Result<Waveform, GeneratorError> {
        Err(GeneratorError::ModelError("CUDA out of memory".to_string()))
    }

    async fn health_check(&self) -> Result<(), GeneratorError> {
        Err(GeneratorError::Unavailable("model not loaded".to_string()))
    }
}

/// In-memory object store recording uploaded keys and bytes.
#[derive(Default)]
pub struct RecordingStore {
    pub uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Upload("AccessDenied".to_string()));
        }
        let data = tokio::fs::read(local_path).await?;
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), data));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", TEST_BUCKET, key)
    }
}

pub fn uploader(store: Arc<RecordingStore>) -> Uploader {
    Uploader {
        store,
        key_prefix: TEST_PREFIX.to_string(),
    }
}
