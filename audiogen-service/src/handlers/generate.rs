use crate::dtos::{GenerateRequest, GenerateResponse};
use crate::services::metrics::{record_generation, record_upload};
use crate::services::storage::{object_key, WAV_CONTENT_TYPE};
use crate::services::write_wav;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use service_core::error::AppError;
use std::time::Instant;

/// Generate audio for a prompt, persist it, and publish it if a bucket is set.
///
/// The body is parsed as JSON whatever the declared content type.
pub async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let text = request
        .prompt()
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Missing 'text'")))?;

    state.outputs.ensure().await.map_err(|e| {
        tracing::error!(
            dir = %state.outputs.base_path().display(),
            error = %e,
            "Failed to create output directory"
        );
        AppError::InternalError(
            anyhow::Error::new(e).context("Failed to create output directory"),
        )
    })?;

    let output = state.outputs.allocate();
    let backend = state.generator.name();

    tracing::info!(
        backend,
        filename = %output.filename,
        prompt_len = text.len(),
        "Audio generation started"
    );

    let started = Instant::now();
    let result = state.generator.generate(text).await;
    record_generation(backend, result.is_ok(), started.elapsed());

    let waveform = result.map_err(|e| {
        tracing::error!(backend, error = %e, "Audio generation failed");
        AppError::InternalError(anyhow::Error::new(e).context("Audio generation failed"))
    })?;

    let sample_count = waveform.samples.len();
    let sample_rate = waveform.sample_rate;
    let duration_secs = waveform.duration_secs();

    write_wav(&output.path, waveform).await.map_err(|e| {
        tracing::error!(path = %output.path.display(), error = %e, "Failed to write WAV file");
        AppError::InternalError(anyhow::Error::new(e).context("Failed to write WAV file"))
    })?;

    let local_path = output.path.display().to_string();
    tracing::info!(
        path = %local_path,
        sample_rate,
        samples = sample_count,
        duration_secs,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Saved file"
    );

    let s3_url = match &state.uploader {
        Some(uploader) => {
            let key = object_key(&uploader.key_prefix, &output.filename);
            let uploaded = uploader
                .store
                .upload_file(&output.path, &key, WAV_CONTENT_TYPE)
                .await;
            record_upload(uploaded.is_ok());

            uploaded.map_err(|e| {
                tracing::error!(key = %key, error = %e, "Failed to upload generated audio");
                AppError::InternalError(anyhow::Error::new(e).context("Upload failed"))
            })?;

            let url = uploader.store.public_url(&key);
            tracing::info!(key = %key, url = %url, "Generated audio uploaded");
            Some(url)
        }
        None => None,
    };

    Ok(Json(GenerateResponse::new(local_path, s3_url)))
}
