//! HTTP request handlers for the web server.

mod analyze;
mod api;
mod types;

// Re-export handlers for use by the router
pub use analyze::analyze_image;
pub use api::health;
