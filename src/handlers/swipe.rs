use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    middleware_layer::auth::BearerToken,
    models::swipe::SwipeAction,
    state::AppState,
    validation::purchase::{known_product_code, parsable_expiry, parse_expiry, validate_request},
};

/// Code returned on every successful response.
const SUCCESS_CODE: &str = "0000";

/// The request payload for a swipe.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ViewProfileRequest {
    /// Skip the current profile and fetch the next one.
    pub swipe_left: bool,
    /// Record a decision on `current_viewed_profile_id`.
    pub swipe_right: bool,
    pub current_viewed_profile_id: i64,
}

/// The response payload for a swipe.
#[derive(Serialize)]
pub struct ViewProfileResponse {
    pub code: &'static str,
    pub id: i64,
    pub is_verified: bool,
    pub full_name: String,
    pub photo_url: String,
}

/// The request payload for a purchase.
#[derive(Deserialize, Debug, Validate)]
pub struct PurchaseRequest {
    #[garde(length(min = 1), custom(known_product_code))]
    pub product_code: String,
    #[garde(length(min = 1, max = 255))]
    pub product_name: String,
    #[garde(custom(parsable_expiry))]
    pub expired_at: String,
}

/// The response payload for a purchase.
#[derive(Serialize)]
pub struct PurchaseResponse {
    pub code: &'static str,
    pub message: String,
}

/// Handles a swipe: a left swipe fetches the next profile, a right swipe
/// records a decision.
#[axum::debug_handler]
pub async fn view_profile(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(payload): Json<ViewProfileRequest>,
) -> Result<Response> {
    tracing::debug!("👆 Swipe request: {:?}", payload);

    let action = SwipeAction::from_flags(
        payload.swipe_left,
        payload.swipe_right,
        payload.current_viewed_profile_id,
    )?;

    let profile = state
        .engine
        .resolve_and_act(&token, action)
        .await?
        .into_profile();

    let response = ViewProfileResponse {
        code: SUCCESS_CODE,
        id: profile.id,
        is_verified: profile.is_verified,
        full_name: profile.full_name,
        photo_url: profile.photo_url,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles an entitlement purchase.
#[axum::debug_handler]
pub async fn purchase(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Response> {
    tracing::info!("💳 Purchase attempt - Payload: {:?}", payload);
    validate_request(&payload)?;
    let expired_at = parse_expiry(&payload.expired_at)?;

    state
        .engine
        .purchase(&token, &payload.product_code, &payload.product_name, expired_at)
        .await?;

    let response = PurchaseResponse {
        code: SUCCESS_CODE,
        message: "Success".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "Server Up"
}
