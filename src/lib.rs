//! Swipe session engine for the kenalan profile-discovery service.
//!
//! Tracks which profiles each viewer has already seen, enforces the daily
//! swipe quota unless the viewer holds the unlimited-swipe entitlement, and
//! picks the next unseen profile of the opposite gender.

pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub mod clients;

pub mod models {
    pub mod profile;
    pub mod session;
    pub mod swipe;
}

pub mod repositories {
    pub mod session;
}

pub mod services {
    pub mod locks;
    pub mod swipe;
}

pub mod handlers {
    pub mod swipe;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod purchase;
}

pub use error::{AppError, Result};
pub use state::AppState;
