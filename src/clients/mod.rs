//! Collaborator services the swipe engine depends on.
//!
//! Each collaborator is an object-safe async trait so the engine can be built
//! over HTTP adapters in production and in-memory fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::profile::{Candidate, Gender, ViewerAccount};

pub mod auth;
pub mod user;

/// Classified failure of a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The credential was rejected.
    #[error("credential rejected")]
    Unauthorized,
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,
    /// The product code is not recognized.
    #[error("product not found")]
    ProductNotFound,
    /// The call did not finish in time.
    #[error("timed out")]
    Timeout,
    /// Connection failure or unexpected status.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Maps an opaque token to the identity it was issued for.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<String, ClientError>;
}

/// Source of the viewer's profile and entitlements.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    /// Loads the viewer's profile id, category and active entitlements.
    async fn get_account(&self, email: &str) -> Result<ViewerAccount, ClientError>;

    /// Creates or replaces an entitlement for the user.
    async fn upsert_entitlement(
        &self,
        email: &str,
        product_code: &str,
        product_name: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<(), ClientError>;
}

/// Picks the next profile to show.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    /// Returns one profile of `gender` whose id is not in `exclude_ids`.
    ///
    /// `ClientError::NotFound` means the pool is exhausted.
    async fn next_candidate(
        &self,
        exclude_ids: &[i64],
        gender: Gender,
    ) -> Result<Candidate, ClientError>;
}

/// Builds the shared HTTP client for collaborator calls.
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(ClientError::from)
}

/// Posts a JSON body and returns the status with the raw response body.
pub(crate) async fn post_json<T: serde::Serialize>(
    client: &reqwest::Client,
    url: &str,
    body: &T,
) -> Result<(http::StatusCode, Vec<u8>), ClientError> {
    let payload = sonic_rs::to_string(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    let response = client
        .post(url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;
    Ok((status, bytes.to_vec()))
}

/// Decodes a JSON response body.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    sonic_rs::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))
}
