use actix_web::{http::StatusCode, HttpResponse, ResponseError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Terminated: {0}")]
    Terminated(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Authentication(_) => "authentication_error",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::InsufficientStock(_) => "insufficient_stock",
            AppError::InvalidState(_) => "invalid_state",
            AppError::InvalidCredentials(_) => "invalid_credentials",
            AppError::Terminated(_) => "terminated",
            AppError::Conflict(_) => "conflict",
            _ => "internal_server_error",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InsufficientStock(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) | AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::Terminated(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::InsufficientStock(msg)
            | AppError::InvalidState(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Terminated(msg)
            | AppError::Conflict(msg) => msg.clone(),
            other => {
                tracing::error!("Request failed: {}", other);
                "An internal server error occurred".to_string()
            }
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        })
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InsufficientStock("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Terminated("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvalidState("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Internal("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = AppError::Internal("pool exhausted".into()).error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Internal("pool exhausted".into()).kind(), "internal_server_error");
    }

    #[test]
    fn test_config_errors_are_server_errors() {
        let error = AppError::from(config::ConfigError::NotFound("jwt_secret".into()));
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_signing_errors_are_server_errors() {
        let error = AppError::from(jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey,
        ));
        assert!(matches!(error, AppError::Jwt(_)));
        assert_eq!(error.kind(), "internal_server_error");
    }
}
