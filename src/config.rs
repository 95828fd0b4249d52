use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use anyhow::{Context, Result};

/// Which backend holds the swipe sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionBackend {
    /// Shared Redis cache.
    Redis,
    /// In-process map, for local runs.
    Memory,
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// Where swipe sessions are kept.
    pub session_backend: SessionBackend,
    /// Lifetime of a swipe session, which is also the quota window.
    pub session_ttl: Duration,
    /// Base URL of the token validation service.
    pub auth_service_url: String,
    /// Base URL of the user/subscription service.
    pub user_service_url: String,
    /// Upper bound for every collaborator and cache call.
    pub collaborator_timeout: Duration,
    /// When true, entitlements returned at hydration are assumed to be unexpired.
    pub trust_provider_expiry: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let session_backend = match env::var("SESSION_STORE")
            .unwrap_or_else(|_| "redis".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "redis" => SessionBackend::Redis,
            "memory" => SessionBackend::Memory,
            other => anyhow::bail!("SESSION_STORE must be `redis` or `memory`, got `{}`", other),
        };

        let session_ttl_secs: u64 = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .context("Invalid SESSION_TTL_SECS")?;

        if session_ttl_secs == 0 {
            anyhow::bail!("SESSION_TTL_SECS must be greater than zero");
        }

        let timeout_secs: u64 = env::var("COLLABORATOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .context("Invalid COLLABORATOR_TIMEOUT_SECS")?;

        Ok(Self {
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_backend,
            session_ttl: Duration::from_secs(session_ttl_secs),
            auth_service_url: env::var("AUTH_SERVICE_URL")
                .context("AUTH_SERVICE_URL must be set")?,
            user_service_url: env::var("USER_SERVICE_URL")
                .context("USER_SERVICE_URL must be set")?,
            collaborator_timeout: Duration::from_secs(timeout_secs),
            trust_provider_expiry: env::var("TRUST_PROVIDER_EXPIRY")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("Invalid TRUST_PROVIDER_EXPIRY (expected true or false)")?,
        })
    }
}
