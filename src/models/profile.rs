use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product code granting swipes beyond the daily quota.
pub const UNLIMITED_SWIPE_PRODUCT_CODE: &str = "UNLIMITED_SWIPE";
/// Product code granting the verified badge.
pub const ACCOUNT_VERIFIED_PRODUCT_CODE: &str = "ACCOUNT_VERIFIED";

/// Product codes the purchase endpoint accepts.
pub const KNOWN_PRODUCT_CODES: [&str; 2] =
    [UNLIMITED_SWIPE_PRODUCT_CODE, ACCOUNT_VERIFIED_PRODUCT_CODE];

/// The binary category a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// The category candidates are drawn from for a viewer of this category.
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

/// An active grant held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub product_code: String,
    pub expired_at: DateTime<Utc>,
}

impl Entitlement {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expired_at > now
    }
}

/// The viewer's own profile plus entitlements, as loaded on hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerAccount {
    /// Profile id; zero means the user service found no profile.
    pub profile_id: i64,
    pub gender: Gender,
    pub entitlements: Vec<Entitlement>,
}

/// A profile offered by the candidate service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: i64,
    pub full_name: String,
    pub photo_url: String,
    /// Product codes of the candidate's entitlements.
    pub entitlement_codes: Vec<String>,
}

/// The profile shown to the viewer after a skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: i64,
    pub full_name: String,
    pub is_verified: bool,
    pub photo_url: String,
}

impl From<Candidate> for Profile {
    fn from(candidate: Candidate) -> Self {
        let is_verified = candidate
            .entitlement_codes
            .iter()
            .any(|code| code == ACCOUNT_VERIFIED_PRODUCT_CODE);

        Self {
            id: candidate.id,
            full_name: candidate.full_name,
            is_verified,
            photo_url: candidate.photo_url,
        }
    }
}
