use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
///
/// Every variant carries a user-facing message (Portuguese, as shown by the
/// frontend). Technical detail is logged at the call site, not returned.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Resource not found (upstream 404 or unknown route).
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Upstream refused the request because of its rate limit.
    RateLimited(String),
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// The message shown to the caller, ignoring any context chain.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::RateLimited(msg)
            | AppError::ExternalApiError(msg)
            | AppError::InternalError(msg) => msg,
            AppError::WithContext { source, .. } => source.user_message(),
        }
    }

    /// HTTP status the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::RateLimited(msg) => write!(f, "Rate limited: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into the `{ success: false, error }` envelope.
    ///
    /// Logs errors according to their severity; validation failures are
    /// expected traffic and only logged at debug level.
    fn into_response(self) -> Response {
        match &self {
            AppError::BadRequest(msg) => tracing::debug!("Rejected request: {}", msg),
            AppError::NotFound(msg) => tracing::info!("Not found: {}", msg),
            AppError::RateLimited(msg) => tracing::warn!("Upstream rate limited: {}", msg),
            AppError::ExternalApiError(msg) => tracing::error!("External API error: {}", msg),
            AppError::InternalError(msg) => tracing::error!("Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                // Log full context chain, then answer as the source would
                tracing::error!("Error with context: {} -> {}", context, source);
            }
        }

        let body = Json(json!({
            "success": false,
            "error": self.user_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP client error: {}", err);
        AppError::ExternalApiError("Erro de conexão com serviço externo.".to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::ExternalApiError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_context_keeps_source_response() {
        let result: Result<(), AppError> =
            Err(AppError::RateLimited("Aguarde".to_string())).context("CPF lookup");
        let err = result.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.user_message(), "Aguarde");
        assert_eq!(err.to_string(), "CPF lookup: Rate limited: Aguarde");
    }
}
