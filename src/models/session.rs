use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::profile::{Gender, ViewerAccount, UNLIMITED_SWIPE_PRODUCT_CODE};

/// Number of swipes allowed per session window without the bypass entitlement.
pub const SWIPE_QUOTA: i64 = 10;

/// The cached swipe state of one viewer.
///
/// A value of this type is always fully hydrated. An identity without a
/// session is represented as `None` by the store, never by a blank value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The viewer's own profile id. Set on hydration and never changed.
    pub viewer_id: i64,
    /// The identity this session belongs to; also the cache key suffix.
    pub email: String,
    /// The viewer's category. Candidates come from the opposite one.
    pub viewer_gender: Gender,
    /// Whether the viewer may swipe past the quota.
    pub is_unlimited_swipe: bool,
    /// Every profile already shown in this window, in order. May hold duplicates.
    pub viewed_profile_ids: Vec<i64>,
    /// Completed skips and decisions in this window.
    pub swipe_count: i64,
}

impl Session {
    /// Builds a fresh session from the viewer's account.
    ///
    /// With `trust_provider_expiry` the entitlement list is taken as already
    /// pruned; otherwise only grants expiring after `now` enable the bypass.
    pub fn hydrate(
        email: &str,
        account: &ViewerAccount,
        trust_provider_expiry: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let is_unlimited_swipe = account.entitlements.iter().any(|entitlement| {
            entitlement.product_code == UNLIMITED_SWIPE_PRODUCT_CODE
                && (trust_provider_expiry || entitlement.is_active_at(now))
        });

        Self {
            viewer_id: account.profile_id,
            email: email.to_string(),
            viewer_gender: account.gender,
            is_unlimited_swipe,
            viewed_profile_ids: Vec::new(),
            swipe_count: 0,
        }
    }

    /// True when the quota gate rejects any further action.
    pub fn quota_exhausted(&self) -> bool {
        self.swipe_count >= SWIPE_QUOTA && !self.is_unlimited_swipe
    }

    /// Ids the candidate service must not return: everything seen plus the viewer.
    pub fn exclusion_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.viewed_profile_ids.len() + 1);
        ids.extend_from_slice(&self.viewed_profile_ids);
        ids.push(self.viewer_id);
        ids
    }

    /// Records a presented candidate.
    pub fn record_view(&mut self, profile_id: i64) {
        self.viewed_profile_ids.push(profile_id);
        self.swipe_count += 1;
    }

    /// Records a decision on an already presented candidate.
    pub fn record_decision(&mut self) {
        self.swipe_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{Entitlement, ACCOUNT_VERIFIED_PRODUCT_CODE};
    use chrono::Duration;

    fn account(entitlements: Vec<Entitlement>) -> ViewerAccount {
        ViewerAccount {
            profile_id: 42,
            gender: Gender::Male,
            entitlements,
        }
    }

    #[test]
    fn hydrate_starts_empty() {
        let now = Utc::now();
        let session = Session::hydrate("budi@example.com", &account(vec![]), true, now);
        assert_eq!(session.viewer_id, 42);
        assert_eq!(session.email, "budi@example.com");
        assert_eq!(session.viewer_gender, Gender::Male);
        assert!(!session.is_unlimited_swipe);
        assert!(session.viewed_profile_ids.is_empty());
        assert_eq!(session.swipe_count, 0);
    }

    #[test]
    fn hydrate_ignores_unrelated_entitlements() {
        let now = Utc::now();
        let grants = vec![Entitlement {
            product_code: ACCOUNT_VERIFIED_PRODUCT_CODE.to_string(),
            expired_at: now + Duration::days(30),
        }];
        let session = Session::hydrate("budi@example.com", &account(grants), true, now);
        assert!(!session.is_unlimited_swipe);
    }

    // Expired bypass grants still count while the provider is trusted to prune them.
    #[test]
    fn expired_bypass_depends_on_trust_policy() {
        let now = Utc::now();
        let grants = vec![Entitlement {
            product_code: UNLIMITED_SWIPE_PRODUCT_CODE.to_string(),
            expired_at: now - Duration::hours(1),
        }];
        let trusted = Session::hydrate("budi@example.com", &account(grants.clone()), true, now);
        assert!(trusted.is_unlimited_swipe);

        let checked = Session::hydrate("budi@example.com", &account(grants), false, now);
        assert!(!checked.is_unlimited_swipe);
    }

    #[test]
    fn exclusion_includes_viewer_and_history() {
        let mut session = Session::hydrate("budi@example.com", &account(vec![]), true, Utc::now());
        session.record_view(5);
        session.record_view(9);
        assert_eq!(session.exclusion_ids(), vec![5, 9, 42]);
        assert_eq!(session.swipe_count, 2);
    }

    #[test]
    fn quota_gate_respects_bypass() {
        let mut session = Session::hydrate("budi@example.com", &account(vec![]), true, Utc::now());
        session.swipe_count = SWIPE_QUOTA - 1;
        assert!(!session.quota_exhausted());
        session.record_decision();
        assert!(session.quota_exhausted());
        session.is_unlimited_swipe = true;
        assert!(!session.quota_exhausted());
    }
}
