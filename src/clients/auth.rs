use async_trait::async_trait;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{decode, http_client, post_json, ClientError, IdentityVerifier};

#[derive(Serialize)]
struct ValidateTokenRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct ValidateTokenResponse {
    is_token_valid: bool,
    #[serde(default)]
    email: String,
}

/// HTTP adapter for the token validation service.
#[derive(Clone)]
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpAuthClient {
    async fn verify_token(&self, token: &str) -> Result<String, ClientError> {
        let url = format!("{}/v1/auth/token/validate", self.base_url);
        let (status, body) = post_json(&self.http, &url, &ValidateTokenRequest { token }).await?;

        match status {
            StatusCode::OK => {
                let response: ValidateTokenResponse = decode(&body)?;
                if !response.is_token_valid || response.email.is_empty() {
                    return Err(ClientError::Unauthorized);
                }
                Ok(response.email)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
            other => Err(ClientError::Transport(format!(
                "token validation returned {}",
                other
            ))),
        }
    }
}
