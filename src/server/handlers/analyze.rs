//! `POST /analyze`: CIN extraction from an uploaded image.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::super::AppState;
use super::types::{AnalyzeError, AnalyzeResponse};
use crate::upload::{read_image_field, UploadError};

/// Receive the image, run OCR and extraction, then drop the temporary file.
///
/// A request that is not multipart at all is treated like one without a
/// file.
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let mut multipart = multipart.map_err(|_| UploadError::NoFileProvided)?;

    let upload = read_image_field(&mut multipart, &state.upload_policy).await?;
    info!(
        path = %upload.path().display(),
        size = upload.size_bytes(),
        extension = %upload.extension(),
        "Received image for analysis"
    );

    let result = state.analyzer.analyze(upload.path()).await;
    upload.remove().await;

    Ok(Json(AnalyzeResponse::from_analysis(result?)))
}
