use chrono::{DateTime, NaiveDateTime, Utc};
use garde::Validate;

use crate::error::{AppError, Result};
use crate::models::profile::KNOWN_PRODUCT_CODES;

/// Layout of `expired_at` without an offset; read as UTC.
const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a purchase expiry, either RFC 3339 or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AppError::Validation("expired_at is not valid".to_string()))
}

/// garde rule: the product code must be one the service sells.
pub fn known_product_code(value: &str, _ctx: &()) -> garde::Result {
    if KNOWN_PRODUCT_CODES.contains(&value) {
        Ok(())
    } else {
        Err(garde::Error::new("product_code is not valid"))
    }
}

/// garde rule: the expiry must parse.
pub fn parsable_expiry(value: &str, _ctx: &()) -> garde::Result {
    parse_expiry(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new("expired_at is not valid"))
}

/// Runs garde validation and folds the report into one validation error.
pub fn validate_request<T: Validate<Context = ()>>(request: &T) -> Result<()> {
    request
        .validate()
        .map_err(|report| AppError::Validation(report.to_string()))
}
