//! Text detection abstraction.
//!
//! The analysis pipeline only sees the `TextDetector` trait, so the remote
//! provider can be swapped for a test double.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from text detection backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("No OCR credentials configured: {0}")]
    MissingCredentials(String),

    #[error("Failed to obtain an access token: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("OCR provider rejected the image: {0}")]
    Provider(String),

    #[error("Invalid OCR response: {0}")]
    InvalidResponse(String),
}

impl OcrError {
    /// Whether the failure happened before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(self, OcrError::MissingCredentials(_) | OcrError::Io(_))
    }
}

/// A point of a bounding polygon, in pixels.
///
/// The provider omits zero coordinates, hence the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

/// Region of the image an annotation was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// A unit of recognized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "boundingPoly", default)]
    pub bounding_poly: BoundingPoly,
}

/// Ordered annotations returned for one image.
///
/// By provider convention the first annotation holds the full text and the
/// following ones hold individual words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionResult {
    pub annotations: Vec<TextAnnotation>,
}

impl RecognitionResult {
    pub fn new(annotations: Vec<TextAnnotation>) -> Self {
        Self { annotations }
    }

    /// Full recognized text, or an empty string when nothing was detected.
    pub fn raw_text(&self) -> &str {
        self.annotations
            .first()
            .map(|a| a.description.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Trait for text detection backends.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Run text detection on an image file. One attempt, no caching.
    async fn detect_text(&self, image_path: &Path) -> Result<RecognitionResult, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(text: &str) -> TextAnnotation {
        TextAnnotation {
            description: text.to_string(),
            bounding_poly: BoundingPoly::default(),
        }
    }

    #[test]
    fn test_raw_text_uses_first_annotation() {
        let result = RecognitionResult::new(vec![
            annotation("CIN 12345678\nTUNIS"),
            annotation("CIN"),
            annotation("12345678"),
        ]);
        assert_eq!(result.raw_text(), "CIN 12345678\nTUNIS");
    }

    #[test]
    fn test_raw_text_empty_result() {
        let result = RecognitionResult::default();
        assert!(result.is_empty());
        assert_eq!(result.raw_text(), "");
    }

    #[test]
    fn test_annotation_missing_coordinates() {
        let json = r#"{"description":"ID","boundingPoly":{"vertices":[{"x":4},{"y":2},{}]}}"#;
        let parsed: TextAnnotation = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.bounding_poly.vertices,
            vec![
                Vertex { x: 4, y: 0 },
                Vertex { x: 0, y: 2 },
                Vertex { x: 0, y: 0 }
            ]
        );
    }

    #[test]
    fn test_local_errors() {
        assert!(OcrError::MissingCredentials("x".into()).is_local());
        assert!(!OcrError::Provider("bad image".into()).is_local());
    }
}
