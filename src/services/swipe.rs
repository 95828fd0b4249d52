use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::clients::{CandidateProvider, ClientError, EntitlementProvider, IdentityVerifier};
use crate::error::{AppError, Result};
use crate::models::profile::{Profile, UNLIMITED_SWIPE_PRODUCT_CODE};
use crate::models::session::Session;
use crate::models::swipe::{SwipeAction, SwipeOutcome};
use crate::repositories::session::SessionStore;
use crate::services::locks::KeyedLocks;

/// Tunables of the swipe engine.
#[derive(Clone, Copy, Debug)]
pub struct SwipeSettings {
    /// Lifetime of a session; the quota resets when it runs out.
    pub session_ttl: Duration,
    /// Treat entitlements from the provider as unexpired at hydration.
    pub trust_provider_expiry: bool,
}

/// Orchestrates session hydration, the swipe quota and candidate selection.
///
/// Every read-modify-write of a session happens under that identity's lock,
/// so concurrent requests for one viewer never lose each other's updates.
#[derive(Clone)]
pub struct SwipeEngine {
    verifier: Arc<dyn IdentityVerifier>,
    entitlements: Arc<dyn EntitlementProvider>,
    candidates: Arc<dyn CandidateProvider>,
    store: Arc<dyn SessionStore>,
    locks: KeyedLocks,
    settings: SwipeSettings,
}

fn collaborator_failure(collaborator: &str, operation: &str, error: ClientError) -> AppError {
    tracing::error!(collaborator, operation, %error, "❌ Collaborator call failed");
    AppError::Internal(format!("{} {} failed", collaborator, operation))
}

fn store_failure(operation: &str, error: AppError) -> AppError {
    tracing::error!(collaborator = "session_store", operation, %error, "❌ Session store call failed");
    AppError::Internal(format!("session store {} failed", operation))
}

impl SwipeEngine {
    /// Creates a new `SwipeEngine` over the given collaborators.
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        entitlements: Arc<dyn EntitlementProvider>,
        candidates: Arc<dyn CandidateProvider>,
        store: Arc<dyn SessionStore>,
        settings: SwipeSettings,
    ) -> Self {
        Self {
            verifier,
            entitlements,
            candidates,
            store,
            locks: KeyedLocks::new(),
            settings,
        }
    }

    /// Resolves the identity behind a bearer token.
    async fn authenticate(&self, token: &str) -> Result<String> {
        let token = token.trim();
        if token.is_empty() {
            tracing::warn!("❌ Missing bearer token");
            return Err(AppError::Unauthorized);
        }

        match self.verifier.verify_token(token).await {
            Ok(email) if !email.is_empty() => Ok(email),
            Ok(_) | Err(ClientError::Unauthorized) => {
                tracing::warn!("❌ Token rejected by auth service");
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(collaborator_failure("auth_service", "verify_token", e)),
        }
    }

    /// Returns the viewer's session, hydrating it on a cache miss.
    ///
    /// # Arguments
    ///
    /// * `token` - The viewer's bearer token.
    ///
    /// # Returns
    ///
    /// A `Result` containing the hydrated `Session`.
    pub async fn resolve_session(&self, token: &str) -> Result<Session> {
        let email = self.authenticate(token).await?;
        let _guard = self.locks.lock(&email).await;
        self.load_or_hydrate(&email).await
    }

    /// Caller must hold the identity's lock.
    async fn load_or_hydrate(&self, email: &str) -> Result<Session> {
        if let Some(session) = self
            .store
            .get(email)
            .await
            .map_err(|e| store_failure("get", e))?
        {
            return Ok(session);
        }

        tracing::debug!("🔄 Hydrating swipe session for {}", email);

        let account = self
            .entitlements
            .get_account(email)
            .await
            .map_err(|e| collaborator_failure("user_service", "get_account", e))?;

        if account.profile_id == 0 {
            tracing::error!(collaborator = "user_service", operation = "get_account", "❌ No profile for {}", email);
            return Err(AppError::Internal("user not found".to_string()));
        }

        let session = Session::hydrate(
            email,
            &account,
            self.settings.trust_provider_expiry,
            Utc::now(),
        );

        self.store
            .put(email, &session, self.settings.session_ttl)
            .await
            .map_err(|e| store_failure("put", e))?;

        tracing::info!(
            "✅ Session hydrated for {} (viewer {}, unlimited: {})",
            email,
            session.viewer_id,
            session.is_unlimited_swipe
        );
        Ok(session)
    }

    /// Applies one action to a session and persists the result.
    ///
    /// Caller must hold the identity's lock. Nothing is written unless every
    /// step succeeded.
    async fn act(&self, mut session: Session, action: SwipeAction) -> Result<(Session, SwipeOutcome)> {
        if session.quota_exhausted() {
            tracing::info!("⛔ Swipe quota used up for {}", session.email);
            return Err(AppError::QuotaExceeded);
        }

        let outcome = match action {
            SwipeAction::Skip => {
                let exclude_ids = session.exclusion_ids();
                let gender = session.viewer_gender.opposite();

                let candidate = match self.candidates.next_candidate(&exclude_ids, gender).await {
                    Ok(candidate) => candidate,
                    Err(ClientError::NotFound) => {
                        tracing::info!("No candidates left for {}", session.email);
                        return Err(AppError::NoCandidates);
                    }
                    Err(e) => return Err(collaborator_failure("user_service", "next_candidate", e)),
                };

                session.record_view(candidate.id);
                SwipeOutcome::Presented(Profile::from(candidate))
            }
            SwipeAction::Decide { target_id } => {
                tracing::debug!("{} decided on profile {}", session.email, target_id);
                session.record_decision();
                SwipeOutcome::Recorded
            }
        };

        self.store
            .put(&session.email, &session, self.settings.session_ttl)
            .await
            .map_err(|e| store_failure("put", e))?;

        Ok((session, outcome))
    }

    /// Authenticates, loads or hydrates the session, and applies `action`.
    ///
    /// # Arguments
    ///
    /// * `token` - The viewer's bearer token.
    /// * `action` - The skip or decision to apply.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SwipeOutcome`.
    pub async fn resolve_and_act(&self, token: &str, action: SwipeAction) -> Result<SwipeOutcome> {
        let email = self.authenticate(token).await?;
        let _guard = self.locks.lock(&email).await;

        let session = self.load_or_hydrate(&email).await?;
        let (session, outcome) = self.act(session, action).await?;

        tracing::debug!(
            "👆 {} swiped ({} of quota used, {} viewed)",
            email,
            session.swipe_count,
            session.viewed_profile_ids.len()
        );
        Ok(outcome)
    }

    /// Records a purchase and, for the bypass product, lifts the quota on the
    /// cached session.
    ///
    /// A missing session is left missing: the next hydration reads the new
    /// entitlement from the provider anyway. The session lifetime is not
    /// extended.
    pub async fn purchase(
        &self,
        token: &str,
        product_code: &str,
        product_name: &str,
        expired_at: DateTime<Utc>,
    ) -> Result<()> {
        let email = self.authenticate(token).await?;

        match self
            .entitlements
            .upsert_entitlement(&email, product_code, product_name, expired_at)
            .await
        {
            Ok(()) => {}
            Err(ClientError::ProductNotFound) => {
                tracing::warn!("❌ Unknown product {} purchased by {}", product_code, email);
                return Err(AppError::ProductNotFound);
            }
            Err(e) => return Err(collaborator_failure("user_service", "upsert_entitlement", e)),
        }

        tracing::info!("💳 {} purchased {} until {}", email, product_code, expired_at);

        if product_code != UNLIMITED_SWIPE_PRODUCT_CODE {
            return Ok(());
        }

        let _guard = self.locks.lock(&email).await;
        let cached = self
            .store
            .get(&email)
            .await
            .map_err(|e| store_failure("get", e))?;

        if let Some(mut session) = cached {
            session.is_unlimited_swipe = true;
            self.store
                .put_keep_ttl(&email, &session)
                .await
                .map_err(|e| store_failure("put_keep_ttl", e))?;
            tracing::info!("✅ Unlimited swipe enabled on cached session for {}", email);
        }

        Ok(())
    }
}
