//! Web server exposing CIN extraction over HTTP.
//!
//! A single `POST /analyze` endpoint takes a multipart `image` field and
//! answers with the recognized text and the extracted CIN, if any.

mod handlers;
mod routes;

pub use routes::create_router;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::analysis::CinAnalyzer;
use crate::config::Settings;
use crate::ocr::TextDetector;
use crate::upload::UploadPolicy;

/// Shared state for the web server.
///
/// Holds only immutable collaborators; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: CinAnalyzer,
    pub upload_policy: Arc<UploadPolicy>,
}

impl AppState {
    pub fn new(detector: Arc<dyn TextDetector>, upload_policy: UploadPolicy) -> Self {
        Self {
            analyzer: CinAnalyzer::new(detector),
            upload_policy: Arc::new(upload_policy),
        }
    }

    /// Build the production state: Vision client plus upload policy.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = settings.ocr.vision_client()?;
        if !client.has_credentials() {
            tracing::warn!(
                "No Vision credentials configured; every analysis will fail until one is set"
            );
        }

        let policy = settings.upload_policy();
        policy.ensure_dir().await?;

        Ok(Self::new(Arc::new(client), policy))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(settings).await?;
    tracing::info!(
        upload_dir = %state.upload_policy.upload_dir().display(),
        max_upload_bytes = state.upload_policy.max_bytes(),
        ocr_backend = state.analyzer.detector_name(),
        "Server configured"
    );
    let app = create_router(state);

    let listener = bind_listener(host, port).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bind a listener, resolving host names such as `localhost`.
///
/// `host` is a name or an IP address without brackets.
async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}:{}: {}", host, port, e))
}
