// region:    --- Imports
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

// endregion: --- Imports

// region:    --- Market Error
/// Errors surfaced by the market service to its callers.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// A request that fails a domain rule. Nothing was written.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// The bid was computed against a minimum that is no longer current.
    #[error("minimum bid changed from {expected} to {current}")]
    StaleMinimum { expected: f64, current: f64 },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    IdConflict { kind: &'static str, id: String },

    #[error("too many concurrent updates, retry later")]
    RetriesExhausted,

    #[error("missing or invalid session")]
    Unauthorized,

    #[error("operation not permitted")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a malformed record payload.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::validation("INVALID_RECORD", message)
    }

    /// Machine-readable code returned in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } => code,
            Self::StaleMinimum { .. } => "STALE_MINIMUM",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::IdConflict { .. } => "ID_CONFLICT",
            Self::RetriesExhausted => "MAX_RETRIES_EXCEEDED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::StaleMinimum { .. } | Self::IdConflict { .. } | Self::RetriesExhausted => {
                StatusCode::CONFLICT
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for MarketError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound {
                kind: kind.label(),
                id,
            },
            StoreError::IdConflict { kind, id } => Self::IdConflict {
                kind: kind.label(),
                id,
            },
            StoreError::RetriesExhausted => Self::RetriesExhausted,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                error!("{:<12} --> {}", "Error", detail);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = match &self {
            Self::StaleMinimum { current, .. } => serde_json::json!({
                "error": message,
                "code": self.code(),
                "minimumBid": current,
            }),
            _ => serde_json::json!({
                "error": message,
                "code": self.code(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

// endregion: --- Market Error

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResourceKind;

    #[test]
    fn store_errors_keep_their_meaning() {
        let err: MarketError = StoreError::NotFound {
            kind: ResourceKind::Auctions,
            id: "a1".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "auction 'a1' not found");

        let err: MarketError = StoreError::RetriesExhausted.into();
        assert_eq!(err.code(), "MAX_RETRIES_EXCEEDED");
    }

    #[test]
    fn validation_codes_map_to_bad_request() {
        let err = MarketError::validation("LOW_BID", "too low");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "LOW_BID");
    }
}
// endregion: --- Tests
