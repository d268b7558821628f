//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod events;
pub mod health;
pub mod users;

use crate::error::AppError;
use crate::extractors::CorrelationId;
use axum::extract::OriginalUri;

// Re-export common handler utilities
pub use health::{health_check, readiness_check};

/// Fallback for unmatched routes and unsupported methods on known paths.
#[allow(clippy::unused_async)]
pub async fn route_not_found(
    correlation_id: CorrelationId,
    OriginalUri(uri): OriginalUri,
) -> AppError {
    tracing::debug!(correlation_id = %correlation_id.0, path = %uri.path(), "Route not found");
    AppError::not_found("Route not found")
}
