/// Error types for the engagement service.
///
/// Every fallible operation funnels into `AppError`, which maps onto an
/// HTTP status and a structured JSON body at the actix boundary. Storage
/// failures always mean the surrounding transaction rolled back; no
/// partial effects are observable.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input: bad ID, out-of-bounds text length, bad cursor
    #[error("Validation error: {0}")]
    Validation(String),

    /// Follow/message directed at the acting user itself
    #[error("Self action: {0}")]
    SelfAction(String),

    /// Referenced user/video/comment does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate edge or unique value (already following, username taken)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Removal of an edge/row that is not there; nothing was changed
    #[error("Nothing to do: {0}")]
    NoOp(String),

    /// Acting user is not allowed to touch the target row
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Missing or invalid credential on an action requiring identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Storage failure; the enclosing transaction was rolled back
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Anything else that should never reach a client verbatim
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the underlying cause is a unique-constraint violation.
    /// Used to turn a raced duplicate insert into a `Conflict`.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::SelfAction(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::NoOp(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Storage details stay in the logs, not in client responses.
        let error_msg = match self {
            AppError::Database(e) => {
                tracing::error!("database error: {}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": error_msg,
            "status": status.as_u16(),
        }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::SelfAction("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NoOp("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = AppError::Conflict("already following user 7".into());
        assert_eq!(err.to_string(), "Conflict: already following user 7");
    }
}
