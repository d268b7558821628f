//! Error types for web handlers.
//!
//! This module maps domain and storage failures onto HTTP responses. Every
//! error body has the same shape:
//!
//! ```json
//! { "error": "Not Found", "message": "Event not found" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use registrar_core::{RegistrationError, StoreError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Message returned to clients for every server-side failure.
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong";

/// Application error type for web handlers.
///
/// Wraps domain errors and implements Axum's `IntoResponse`, so handlers can
/// return `Result<_, AppError>` and use `?` on repository calls.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<UserView>, AppError> {
///     let user = state.users.find_user(&id).await?
///         .ok_or_else(|| AppError::not_found("User not found"))?;
///     Ok(Json(UserView::from(user)))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error category (`"Not Found"`, `"Conflict"`, ...)
    error: &'static str,
    /// Error message (user-facing)
    message: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", message)
    }

    /// Create a 400 error for a rejected field or schema check.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", message)
    }

    /// Create a 400 error for an identifier that is not 24 hex characters.
    #[must_use]
    pub fn invalid_id() -> Self {
        Self::bad_request("Invalid ID format")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", message)
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "Conflict", message)
    }

    /// Create a 500 Internal Server Error.
    ///
    /// The client always sees the generic message; attach the cause with
    /// [`with_source`](Self::with_source) so it reaches the logs.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            GENERIC_SERVER_MESSAGE,
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable", message)
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error category.
    error: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            error: self.error,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(messages) => Self::validation(messages.join(", ")),
            StoreError::Duplicate(field) => {
                tracing::debug!(field = %field, "Duplicate value rejected");
                Self::conflict("Resource already exists")
            }
            StoreError::InvalidId(_) => Self::invalid_id(),
            StoreError::Database(_) => Self::internal().with_source(anyhow::Error::new(err)),
        }
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::UserNotFound
            | RegistrationError::EventNotFound
            | RegistrationError::NotRegistered => Self::not_found(err.to_string()),
            RegistrationError::PastEvent => Self::bad_request(err.to_string()),
            RegistrationError::AlreadyRegistered | RegistrationError::EventFull => {
                Self::conflict(err.to_string())
            }
            RegistrationError::Store(store) => store.into(),
        }
    }
}
