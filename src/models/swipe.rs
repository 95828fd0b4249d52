use crate::error::{AppError, Result};
use crate::models::profile::Profile;

/// One swipe interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    /// Pass on the current profile and ask for a new one.
    Skip,
    /// Record a decision on a profile that was already presented.
    Decide { target_id: i64 },
}

impl SwipeAction {
    /// Builds an action from the left/right flags of a request.
    ///
    /// Exactly one flag must be set, and a decision needs a non-zero target.
    pub fn from_flags(skip: bool, decide: bool, target_id: i64) -> Result<Self> {
        match (skip, decide) {
            (true, true) => Err(AppError::InvalidAction(
                "swipe_left and swipe_right cannot both be true".to_string(),
            )),
            (false, false) => Err(AppError::InvalidAction(
                "swipe_left and swipe_right cannot both be false".to_string(),
            )),
            (true, false) => Ok(SwipeAction::Skip),
            (false, true) if target_id == 0 => Err(AppError::InvalidAction(
                "current_viewed_profile_id is not valid".to_string(),
            )),
            (false, true) => Ok(SwipeAction::Decide { target_id }),
        }
    }
}

/// What a successful action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// A skip presented this profile.
    Presented(Profile),
    /// A decision was counted.
    Recorded,
}

impl SwipeOutcome {
    /// The presented profile, or an empty one for a decision.
    pub fn into_profile(self) -> Profile {
        match self {
            SwipeOutcome::Presented(profile) => profile,
            SwipeOutcome::Recorded => Profile::default(),
        }
    }
}
