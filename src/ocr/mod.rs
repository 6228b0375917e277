//! OCR module.
//!
//! Text detection goes through the `TextDetector` trait. The production
//! backend is Google Cloud Vision (`GoogleVisionClient`); the handler gets
//! its detector injected so tests can substitute a double.

mod auth;
mod backend;
mod vision;

pub use auth::{
    credentials_from_key_file, AccessTokenSource, Credentials, ServiceAccountTokens,
    CLOUD_VISION_SCOPE,
};
pub use backend::{
    BoundingPoly, OcrError, RecognitionResult, TextAnnotation, TextDetector, Vertex,
};
pub use vision::{GoogleVisionClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
