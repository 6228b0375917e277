//! Recognition followed by extraction, shared by the server and the CLI.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::extract::{extract_cin, ExtractionOutcome};
use crate::ocr::{OcrError, TextDetector};

/// Outcome of analysing one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Full recognized text (empty when nothing was detected).
    pub raw_text: String,
    pub outcome: ExtractionOutcome,
}

/// Runs text detection on an image and applies the CIN rule to the result.
#[derive(Clone)]
pub struct CinAnalyzer {
    detector: Arc<dyn TextDetector>,
}

impl CinAnalyzer {
    pub fn new(detector: Arc<dyn TextDetector>) -> Self {
        Self { detector }
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    pub async fn analyze(&self, image_path: &Path) -> Result<Analysis, OcrError> {
        let recognition = self.detector.detect_text(image_path).await?;
        let raw_text = recognition.raw_text().to_string();
        debug!(
            backend = self.detector.name(),
            annotations = recognition.annotations.len(),
            raw_text = %raw_text,
            "Text detected"
        );

        let outcome = extract_cin(&raw_text);
        info!(found = outcome.found(), "CIN extraction finished");

        Ok(Analysis { raw_text, outcome })
    }
}
