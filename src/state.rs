use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::clients::{auth::HttpAuthClient, user::HttpUserClient};
use crate::config::{Config, SessionBackend};
use crate::error::{AppError, Result};
use crate::repositories::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use crate::services::swipe::{SwipeEngine, SwipeSettings};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The swipe session engine.
    pub engine: Arc<SwipeEngine>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Redis => {
                let redis_client = redis::Client::open(config.redis_url.as_str())?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized (pooled)");
                Arc::new(RedisSessionStore::new(redis, config.collaborator_timeout))
            }
            SessionBackend::Memory => {
                tracing::warn!("⚠️ Using in-memory session store; sessions are not shared");
                Arc::new(MemorySessionStore::new())
            }
        };

        let auth = HttpAuthClient::new(&config.auth_service_url, config.collaborator_timeout)
            .map_err(|e| AppError::Internal(format!("auth client: {}", e)))?;
        let users = Arc::new(
            HttpUserClient::new(&config.user_service_url, config.collaborator_timeout)
                .map_err(|e| AppError::Internal(format!("user client: {}", e)))?,
        );
        tracing::info!("✅ Collaborator clients initialized");

        let engine = SwipeEngine::new(
            Arc::new(auth),
            users.clone(),
            users,
            store,
            SwipeSettings {
                session_ttl: config.session_ttl,
                trust_provider_expiry: config.trust_provider_expiry,
            },
        );

        Ok(Self::with_engine(engine))
    }

    /// Wraps an already built engine.
    pub fn with_engine(engine: SwipeEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
