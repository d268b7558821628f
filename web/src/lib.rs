//! Axum HTTP API for the event registration service.
//!
//! This crate is the imperative shell around `registrar-core`: it parses and
//! validates requests, calls the repositories and the registration workflow,
//! and maps results onto JSON responses.
//!
//! # Request Flow
//!
//! ```text
//! HTTP request
//!   → correlation id, tracing span, CORS
//!   → extractors (RecordIdPath, ValidatedJson)   ← 400 on bad input
//!   → handler → repository / registration workflow
//!   → JSON response, or AppError → {"error", "message"}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use registrar_web::{AppState, build_router};
//! use registrar_core::SystemClock;
//! use std::sync::Arc;
//!
//! let state = AppState::from_repository(repository, Arc::new(SystemClock));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5002").await?;
//! axum::serve(listener, build_router(state)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;
pub mod validation;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{CorrelationId, RecordIdPath, ValidatedJson};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;
