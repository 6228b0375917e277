//! Google Cloud Vision text detection backend.
//!
//! Sends the image inline (base64) to `images:annotate` with the
//! `TEXT_DETECTION` feature. Authenticates either with an API key passed as
//! the `key` query parameter or with a service-account bearer token.
//!
//! Every call is a single attempt: no retry, no backoff, no caching. The
//! HTTP client carries a request timeout so a hanging provider cannot hold
//! a request forever.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::auth::Credentials;
use super::backend::{OcrError, RecognitionResult, TextAnnotation, TextDetector};

/// Default provider base URL.
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

/// Default request timeout for annotate calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Vision client.
pub struct GoogleVisionClient {
    client: Client,
    endpoint: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(rename = "textAnnotations", default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiStatus,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

impl GoogleVisionClient {
    /// Create a client against the public endpoint with the default timeout.
    pub fn new(credentials: Option<Credentials>) -> Result<Self, OcrError> {
        Self::with_options(DEFAULT_ENDPOINT, credentials, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit endpoint and request timeout.
    pub fn with_options(
        endpoint: impl Into<String>,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, OcrError> {
        let client = Client::builder()
            .user_agent(concat!("cinscan/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.endpoint)
    }

    fn build_request(image_bytes: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: base64::engine::general_purpose::STANDARD.encode(image_bytes),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        }
    }
}

/// Turn a raw annotate response body into a recognition result.
fn parse_annotate_response(body: &str) -> Result<RecognitionResult, OcrError> {
    let parsed: AnnotateResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let response = parsed
        .responses
        .into_iter()
        .next()
        .ok_or_else(|| OcrError::InvalidResponse("Empty responses array".to_string()))?;

    if let Some(error) = response.error {
        return Err(OcrError::Provider(error.message));
    }

    Ok(RecognitionResult::new(response.text_annotations))
}

/// Best-effort error message from a non-success response body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl TextDetector for GoogleVisionClient {
    fn name(&self) -> &'static str {
        "google-vision"
    }

    async fn detect_text(&self, image_path: &Path) -> Result<RecognitionResult, OcrError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            OcrError::MissingCredentials(
                "set GOOGLE_VISION_API_KEY or point GOOGLE_CLOUD_KEY at a key file".to_string(),
            )
        })?;

        let image_bytes = tokio::fs::read(image_path).await?;
        let request = Self::build_request(&image_bytes);

        let builder = self.client.post(self.annotate_url());
        let builder = match credentials {
            Credentials::ApiKey(key) => builder.query(&[("key", key)]),
            Credentials::ServiceAccount(tokens) => {
                builder.bearer_auth(tokens.access_token().await?)
            }
        };

        let start = Instant::now();
        let response = builder.json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Vision annotate call finished"
        );

        if !status.is_success() {
            return Err(OcrError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        parse_annotate_response(&body)
    }
}
