//! # Registrar Core
//!
//! Domain types and rules for the event registration service.
//!
//! This crate knows nothing about HTTP or SQL. It provides:
//!
//! - **Entities**: [`User`] and [`Event`], identified by [`RecordId`]
//! - **Derived fields**: remaining capacity, percentage full, status, and
//!   formatted date, computed from stored fields on demand
//! - **Validation**: field predicates shared by request checks and
//!   storage-schema checks
//! - **Repository traits**: [`UserRepository`] and [`EventRepository`],
//!   implemented by the Postgres and in-memory backends
//! - **Registration workflow**: [`registration::register`] and
//!   [`registration::cancel`]
//!
//! ## Architecture Principles
//!
//! - Time is injected through [`environment::Clock`]
//! - Every registration change is one atomic conditional write
//! - Derived values are never persisted
//!
//! ## Example
//!
//! ```
//! use registrar_core::{Event, EventDraft, EventStatus};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let mut event = Event::create(
//!     EventDraft::new("Rust Meetup", now + Duration::days(7), "Hall A", 2),
//!     now,
//! );
//!
//! event.admit(registrar_core::RecordId::new(), now).unwrap();
//! event.admit(registrar_core::RecordId::new(), now).unwrap();
//!
//! assert_eq!(event.remaining_capacity(), 0);
//! assert_eq!(event.status_at(now), EventStatus::Full);
//! ```

pub mod environment;
pub mod event;
pub mod id;
pub mod registration;
pub mod repository;
pub mod user;
pub mod validation;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use environment::{Clock, SystemClock};
pub use event::{Event, EventDraft, EventStatus, Occupancy};
pub use id::{ParseRecordIdError, RecordId};
pub use registration::RegistrationError;
pub use repository::{EventRepository, StoreError, UserRepository};
pub use user::{User, UserDraft};
pub use validation::ValidationError;
