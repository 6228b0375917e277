//! Response bodies and error mapping for the HTTP API.

use std::borrow::Cow;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::analysis::Analysis;
use crate::ocr::OcrError;
use crate::upload::UploadError;

pub const MSG_FOUND: &str = "CIN détecté avec succès.";
pub const MSG_NOT_FOUND: &str = "CIN non détecté, vérifiez la qualité de l'image.";
pub const MSG_NO_FILE: &str = "Aucun fichier envoyé";
pub const MSG_UNSUPPORTED: &str = "Format d'image non supporté";
pub const MSG_MULTIPLE_FILES: &str = "Un seul fichier est accepté";
pub const MSG_MALFORMED: &str = "Requête d'envoi invalide";
pub const MSG_STORAGE: &str = "Erreur lors de l'enregistrement du fichier";
pub const MSG_OCR: &str = "Erreur Vision API";

/// Body of a completed analysis, whether or not a CIN was found.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub cin: Option<String>,
    pub message: &'static str,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

impl AnalyzeResponse {
    pub fn from_analysis(analysis: Analysis) -> Self {
        let success = analysis.outcome.found();
        Self {
            success,
            cin: analysis.outcome.value,
            message: if success { MSG_FOUND } else { MSG_NOT_FOUND },
            raw_text: analysis.raw_text,
        }
    }
}

/// Oversize message naming the configured ceiling.
pub fn too_large_message(limit: u64) -> String {
    format!("Fichier trop volumineux ({} maximum)", size_label(limit))
}

fn size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} Mo", bytes / MIB)
    } else if bytes >= KIB && bytes % KIB == 0 {
        format!("{} Ko", bytes / KIB)
    } else {
        format!("{} octets", bytes)
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: Cow<'static, str>,
}

/// Failures of `POST /analyze`, rendered without internal detail.
#[derive(Debug)]
pub enum AnalyzeError {
    Upload(UploadError),
    Ocr(OcrError),
}

impl From<UploadError> for AnalyzeError {
    fn from(err: UploadError) -> Self {
        AnalyzeError::Upload(err)
    }
}

impl From<OcrError> for AnalyzeError {
    fn from(err: OcrError) -> Self {
        AnalyzeError::Ocr(err)
    }
}

impl AnalyzeError {
    pub fn status_and_message(&self) -> (StatusCode, Cow<'static, str>) {
        let (status, message) = match self {
            AnalyzeError::Upload(err) => match err {
                UploadError::NoFileProvided => (StatusCode::BAD_REQUEST, MSG_NO_FILE),
                UploadError::UnsupportedFormat { .. } => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, MSG_UNSUPPORTED)
                }
                UploadError::PayloadTooLarge { limit } => {
                    return (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Cow::Owned(too_large_message(*limit)),
                    )
                }
                UploadError::MultipleFiles => (StatusCode::BAD_REQUEST, MSG_MULTIPLE_FILES),
                UploadError::Malformed(_) => (StatusCode::BAD_REQUEST, MSG_MALFORMED),
                UploadError::Filesystem(_) => (StatusCode::INTERNAL_SERVER_ERROR, MSG_STORAGE),
            },
            AnalyzeError::Ocr(_) => (StatusCode::INTERNAL_SERVER_ERROR, MSG_OCR),
        };
        (status, Cow::Borrowed(message))
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        match &self {
            AnalyzeError::Upload(UploadError::Filesystem(e)) => {
                error!(error = %e, "Failed to store upload")
            }
            AnalyzeError::Upload(e) => warn!(error = %e, "Upload rejected"),
            AnalyzeError::Ocr(e) => error!(error = %e, local = e.is_local(), "OCR call failed"),
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
