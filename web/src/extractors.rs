//! Custom Axum extractors.
//!
//! This module contains custom extractors for common HTTP patterns:
//! - `CorrelationId`: Extract or generate request correlation IDs
//! - `RecordIdPath`: Parse the `:id` path segment into a [`RecordId`]
//! - `ValidatedJson`: Parse a JSON body and run its field checks before the
//!   handler body executes
//!
//! # Examples
//!
//! ```ignore
//! use registrar_web::extractors::{RecordIdPath, ValidatedJson};
//! use registrar_web::validation::RegistrationRequest;
//!
//! async fn register(
//!     State(state): State<AppState>,
//!     RecordIdPath(event_id): RecordIdPath,
//!     ValidatedJson(user_id): ValidatedJson<RegistrationRequest>,
//! ) -> Result<Json<RegistrationResponse>, AppError> {
//!     ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use crate::validation::Validate;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use registrar_core::RecordId;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Reads the ID stored by the correlation middleware, falling back to the
/// `X-Correlation-ID` header, or generates a new UUID v4 if neither is present.
///
/// # Example
///
/// ```ignore
/// async fn handler(correlation_id: CorrelationId) -> String {
///     format!("Request ID: {}", correlation_id.0)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// A `:id` path segment parsed as a [`RecordId`].
///
/// Rejects with 400 `Invalid ID format` when the segment is not 24
/// hexadecimal characters.
#[derive(Debug, Clone, Copy)]
pub struct RecordIdPath(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for RecordIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::invalid_id())?;

        raw.parse()
            .map(Self)
            .map_err(|_| AppError::invalid_id())
    }
}

/// A JSON body that passed its field checks.
///
/// Holds the validated value (`T::Validated`), not the raw body. Bodies that
/// are not JSON reject with 400 `Bad Request`; failed field checks reject
/// with 400 `Validation Error` and the field message.
pub struct ValidatedJson<T: Validate>(pub T::Validated);

impl<T> fmt::Debug for ValidatedJson<T>
where
    T: Validate,
    T::Validated: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValidatedJson").field(&self.0).finish()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: Validate + DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        Ok(Self(body.validate()?))
    }
}
