//! cinscan - national ID number extraction from ID card images.
//!
//! Uploaded images are validated, stored for the duration of a single
//! request, sent to a cloud OCR provider, and scanned for a standalone
//! 8-digit CIN.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extract;
pub mod ocr;
pub mod server;
pub mod upload;
