use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kenalan_swipe::clients::{CandidateProvider, ClientError, EntitlementProvider, IdentityVerifier};
use kenalan_swipe::models::profile::{
    Candidate, Entitlement, Gender, ViewerAccount, KNOWN_PRODUCT_CODES,
};
use kenalan_swipe::repositories::session::MemorySessionStore;
use kenalan_swipe::services::swipe::{SwipeEngine, SwipeSettings};
use kenalan_swipe::AppState;

pub const TOKEN: &str = "token-ayu";
pub const EMAIL: &str = "ayu@example.com";

/// Token service that knows one token.
pub struct StaticAuth;

#[async_trait]
impl IdentityVerifier for StaticAuth {
    async fn verify_token(&self, token: &str) -> Result<String, ClientError> {
        if token == TOKEN {
            Ok(EMAIL.to_string())
        } else {
            Err(ClientError::Unauthorized)
        }
    }
}

/// User service backed by a fixed candidate pool.
pub struct PoolUsers {
    pub accounts: Mutex<HashMap<String, ViewerAccount>>,
    pub pool: Vec<(i64, Gender)>,
}

impl PoolUsers {
    pub fn new(pool_size: i64) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            EMAIL.to_string(),
            ViewerAccount {
                profile_id: 100,
                gender: Gender::Female,
                entitlements: Vec::new(),
            },
        );
        Self {
            accounts: Mutex::new(accounts),
            pool: (1..=pool_size).map(|id| (id, Gender::Male)).collect(),
        }
    }
}

#[async_trait]
impl EntitlementProvider for PoolUsers {
    async fn get_account(&self, email: &str) -> Result<ViewerAccount, ClientError> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn upsert_entitlement(
        &self,
        email: &str,
        product_code: &str,
        _product_name: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<(), ClientError> {
        if !KNOWN_PRODUCT_CODES.contains(&product_code) {
            return Err(ClientError::ProductNotFound);
        }
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(email).ok_or(ClientError::NotFound)?;
        account.entitlements.push(Entitlement {
            product_code: product_code.to_string(),
            expired_at,
        });
        Ok(())
    }
}

#[async_trait]
impl CandidateProvider for PoolUsers {
    async fn next_candidate(
        &self,
        exclude_ids: &[i64],
        gender: Gender,
    ) -> Result<Candidate, ClientError> {
        self.pool
            .iter()
            .find(|(id, g)| *g == gender && !exclude_ids.contains(id))
            .map(|(id, _)| Candidate {
                id: *id,
                full_name: format!("Candidate {}", id),
                photo_url: format!("https://cdn.example/{}.jpg", id),
                entitlement_codes: Vec::new(),
            })
            .ok_or(ClientError::NotFound)
    }
}

pub struct TestApp {
    pub state: AppState,
    pub store: MemorySessionStore,
}

pub fn test_app(pool_size: i64) -> TestApp {
    let users = Arc::new(PoolUsers::new(pool_size));
    let store = MemorySessionStore::new();
    let engine = SwipeEngine::new(
        Arc::new(StaticAuth),
        users.clone(),
        users,
        Arc::new(store.clone()),
        SwipeSettings {
            session_ttl: Duration::from_secs(86400),
            trust_provider_expiry: true,
        },
    );
    TestApp {
        state: AppState::with_engine(engine),
        store,
    }
}
