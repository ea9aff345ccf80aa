use crate::services::storage::content_type_for;
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;
use tokio_util::io::ReaderStream;

/// Stream a generated file back as an attachment.
pub async fn download(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound(anyhow::anyhow!("File not found"));

    // A name that does not decode to UTF-8 cannot exist in the output dir.
    let Path(filename) = filename.map_err(|rejection| {
        tracing::info!(error = %rejection, "Rejected download path");
        not_found()
    })?;

    let path = state.outputs.resolve(&filename).await.ok_or_else(|| {
        tracing::info!(filename = %filename, "Requested file not found");
        not_found()
    })?;

    // The file may disappear between resolve and open.
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to open file");
        not_found()
    })?;
    let size = file.metadata().await?.len();

    tracing::info!(filename = %filename, size, "Download started");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
