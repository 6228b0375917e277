//! Credentials for the Vision API.
//!
//! Two modes are supported: a plain API key sent as the `key` query
//! parameter, and a Google service-account JSON key, exchanged for an
//! OAuth2 access token sent as `Authorization: Bearer`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use serde::Deserialize;

use super::backend::OcrError;

/// OAuth2 scope requested for service-account tokens.
pub const CLOUD_VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";

/// Source of short-lived OAuth2 access tokens.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, OcrError>;
}

/// Tokens minted from a service-account key.
///
/// `gcp_auth` caches each token until shortly before it expires.
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
}

impl ServiceAccountTokens {
    /// Parse a service-account key document.
    pub fn from_json(json: &str) -> Result<Self, gcp_auth::Error> {
        Ok(Self {
            account: CustomServiceAccount::from_json(json)?,
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, OcrError> {
        let token = self
            .account
            .token(&[CLOUD_VISION_SCOPE])
            .await
            .map_err(|e| OcrError::Auth(e.to_string()))?;
        Ok(token.as_str().to_string())
    }
}

/// How annotate calls authenticate.
#[derive(Clone)]
pub enum Credentials {
    ApiKey(String),
    ServiceAccount(Arc<dyn AccessTokenSource>),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("ApiKey(****)"),
            Credentials::ServiceAccount(_) => f.write_str("ServiceAccount"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct KeyFileHeader {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Interpret the content of a credentials file.
///
/// A JSON document must be a service-account key; anything else is taken
/// as a plain API key. The caller has already trimmed and checked the
/// content for emptiness.
pub fn credentials_from_key_file(content: &str) -> Result<Credentials, String> {
    if !content.starts_with('{') {
        return Ok(Credentials::ApiKey(content.to_string()));
    }

    let header: KeyFileHeader =
        serde_json::from_str(content).map_err(|e| format!("not valid JSON: {}", e))?;
    match header.kind.as_deref() {
        Some("service_account") => {
            let tokens = ServiceAccountTokens::from_json(content)
                .map_err(|e| format!("invalid service account key: {}", e))?;
            Ok(Credentials::ServiceAccount(Arc::new(tokens)))
        }
        Some(other) => Err(format!("unsupported credential type {:?}", other)),
        None => Err("JSON key file has no \"type\" field".to_string()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Hands out a fixed token, or fails.
    pub struct StaticToken(pub Option<&'static str>);

    #[async_trait]
    impl AccessTokenSource for StaticToken {
        async fn access_token(&self) -> Result<String, OcrError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| OcrError::Auth("token endpoint unreachable".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_ACCOUNT_KEY: &str = include_str!("testdata/service_account.json");

    #[test]
    fn test_plain_key() {
        match credentials_from_key_file("AIzaSyExample").unwrap() {
            Credentials::ApiKey(key) => assert_eq!(key, "AIzaSyExample"),
            other => panic!("unexpected credentials: {other:?}"),
        }
    }

    #[test]
    fn test_service_account_key() {
        let credentials = credentials_from_key_file(SERVICE_ACCOUNT_KEY.trim()).unwrap();
        assert!(matches!(credentials, Credentials::ServiceAccount(_)));
    }

    #[test]
    fn test_service_account_with_bad_private_key() {
        let json = r#"{"type":"service_account","project_id":"p","private_key":"nope","client_email":"a@b.c","token_uri":"https://oauth2.googleapis.com/token"}"#;
        let err = credentials_from_key_file(json).unwrap_err();
        assert!(err.starts_with("invalid service account key"));
    }

    #[test]
    fn test_other_json_credentials_rejected() {
        let err = credentials_from_key_file(r#"{"type":"authorized_user"}"#).unwrap_err();
        assert!(err.contains("authorized_user"));

        assert!(credentials_from_key_file(r#"{"project_id":"p"}"#).is_err());
        assert!(credentials_from_key_file("{ broken").is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let shown = format!("{:?}", Credentials::ApiKey("secret".to_string()));
        assert!(!shown.contains("secret"));
    }
}
