use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The bearer token is missing, malformed, invalid or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// The interaction quota is used up and no bypass entitlement is held.
    #[error("Already used up all swipe quota")]
    QuotaExceeded,

    /// Every opposite-category candidate has already been shown.
    #[error("No more profiles available")]
    NoCandidates,

    /// The entitlement service does not know the product code.
    #[error("Product not found")]
    ProductNotFound,

    /// Skip and decide flags do not select exactly one action.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Short machine readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Redis(_) | AppError::Internal(_) => "5000",
            AppError::Unauthorized => "4010",
            AppError::QuotaExceeded => "4290",
            AppError::NoCandidates => "4040",
            AppError::ProductNotFound => "4001",
            AppError::InvalidAction(_) => "4002",
            AppError::Validation(_) => "4000",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error".to_string())
            }

            AppError::Unauthorized => {
                tracing::warn!("Unauthorized request");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }

            AppError::QuotaExceeded => {
                tracing::debug!("Swipe quota exceeded");
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }

            AppError::NoCandidates => {
                tracing::debug!("No candidates left");
                (StatusCode::NOT_FOUND, self.to_string())
            }

            AppError::ProductNotFound => {
                tracing::debug!("Product not found");
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AppError::InvalidAction(ref msg) => {
                tracing::debug!("Invalid action: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "code": self.code(),
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"code":"5000","error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
