use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{decode, http_client, post_json, CandidateProvider, ClientError, EntitlementProvider};
use crate::models::profile::{Candidate, Entitlement, Gender, ViewerAccount};

#[derive(Serialize)]
struct SubscriptionRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct SubscriptionResponse {
    user: AccountUser,
    #[serde(default)]
    subscriptions: Vec<Entitlement>,
}

#[derive(Deserialize)]
struct AccountUser {
    id: i64,
    gender: Gender,
}

#[derive(Serialize)]
struct UpsertSubscriptionRequest<'a> {
    email: &'a str,
    product_code: &'a str,
    product_name: &'a str,
    expired_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct NextProfileRequest<'a> {
    ids: &'a [i64],
    gender: Gender,
}

#[derive(Deserialize)]
struct NextProfileResponse {
    user: CandidateUser,
    #[serde(default)]
    subscriptions: Vec<CandidateSubscription>,
}

#[derive(Deserialize)]
struct CandidateUser {
    id: i64,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    photo_url: String,
}

#[derive(Deserialize)]
struct CandidateSubscription {
    product_code: String,
}

/// HTTP adapter for the user/subscription service.
///
/// One service answers both the viewer's own account lookups and the
/// candidate queries, so this type implements both collaborator traits.
#[derive(Clone)]
pub struct HttpUserClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn unexpected(operation: &str, status: StatusCode) -> ClientError {
    ClientError::Transport(format!("{} returned {}", operation, status))
}

#[async_trait]
impl EntitlementProvider for HttpUserClient {
    async fn get_account(&self, email: &str) -> Result<ViewerAccount, ClientError> {
        let (status, body) = post_json(
            &self.http,
            &self.url("/v1/users/subscription/get"),
            &SubscriptionRequest { email },
        )
        .await?;

        match status {
            StatusCode::OK => {
                let response: SubscriptionResponse = decode(&body)?;
                if response.user.id == 0 {
                    return Err(ClientError::NotFound);
                }
                Ok(ViewerAccount {
                    profile_id: response.user.id,
                    gender: response.user.gender,
                    entitlements: response.subscriptions,
                })
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            other => Err(unexpected("get subscription", other)),
        }
    }

    async fn upsert_entitlement(
        &self,
        email: &str,
        product_code: &str,
        product_name: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<(), ClientError> {
        let request = UpsertSubscriptionRequest {
            email,
            product_code,
            product_name,
            expired_at,
        };
        let (status, _) = post_json(
            &self.http,
            &self.url("/v1/users/subscription/upsert"),
            &request,
        )
        .await?;

        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                Err(ClientError::ProductNotFound)
            }
            other => Err(unexpected("upsert subscription", other)),
        }
    }
}

#[async_trait]
impl CandidateProvider for HttpUserClient {
    async fn next_candidate(
        &self,
        exclude_ids: &[i64],
        gender: Gender,
    ) -> Result<Candidate, ClientError> {
        let (status, body) = post_json(
            &self.http,
            &self.url("/v1/users/next_profile"),
            &NextProfileRequest {
                ids: exclude_ids,
                gender,
            },
        )
        .await?;

        match status {
            StatusCode::OK => {
                let response: NextProfileResponse = decode(&body)?;
                if response.user.id == 0 {
                    return Err(ClientError::NotFound);
                }
                Ok(Candidate {
                    id: response.user.id,
                    full_name: response.user.full_name,
                    photo_url: response.user.photo_url,
                    entitlement_codes: response
                        .subscriptions
                        .into_iter()
                        .map(|s| s.product_code)
                        .collect(),
                })
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound),
            other => Err(unexpected("next profile", other)),
        }
    }
}
