//! CIN extraction from recognized text.
//!
//! The rule is purely syntactic: the leftmost run of exactly eight ASCII
//! digits that stands alone as a word. No checksum or date plausibility
//! checks are applied, and when several candidates appear the leftmost one
//! wins. Identity cards carry a single candidate in practice.

use regex::Regex;
use std::sync::LazyLock;

/// Eight digits bounded by a non-word character or the string edge.
///
/// Word characters are `[A-Za-z0-9_]`, so `A12345678` and `123456789` are
/// rejected while `N°12345678` and `(12345678)` are accepted.
static CIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_])([0-9]{8})(?:[^A-Za-z0-9_]|$)").unwrap()
});

/// Result of applying the extraction rule to a text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionOutcome {
    /// The matched identifier, if any.
    pub value: Option<String>,
}

impl ExtractionOutcome {
    /// Whether a CIN was found.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }

    pub fn cin(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Find the first standalone 8-digit sequence in `text`.
pub fn extract_cin(text: &str) -> ExtractionOutcome {
    let value = CIN_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    ExtractionOutcome { value }
}
