//! Storage abstraction for users and events.
//!
//! Two implementations exist:
//!
//! - `PostgresRepository` (in `registrar-postgres`): production storage
//! - `InMemoryRepository` (in `registrar-testing`): fast, deterministic tests
//!
//! Both implement every write as a single atomic operation on one record.
//! Registration in particular is a conditional append ("only if upcoming,
//! not yet registered, and below capacity") rather than a read followed by a
//! write, so concurrent requests for the last place cannot overfill an event.
//!
//! # Dyn Compatibility
//!
//! The traits use `async_trait` so handlers can hold `Arc<dyn UserRepository>`
//! and `Arc<dyn EventRepository>` without being generic over the backend.

use crate::event::{Event, EventDraft};
use crate::id::RecordId;
use crate::registration::RegistrationError;
use crate::user::{User, UserDraft};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record failed schema validation. Holds one message per violation.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A unique field already holds this value.
    #[error("Duplicate value: {0}")]
    Duplicate(String),

    /// A stored or supplied identifier is malformed.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Connection, query, or decoding failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Fails with [`StoreError::Validation`] when `violations` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns the violations wrapped in `StoreError::Validation`.
    pub fn check_schema(violations: Vec<String>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Validation(violations))
        }
    }
}

/// Persistent storage for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if the draft breaks the schema
    /// - [`StoreError::Duplicate`] if the email is taken
    async fn insert_user(&self, draft: UserDraft, now: DateTime<Utc>) -> Result<User, StoreError>;

    /// Loads a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, StoreError>;

    /// Loads every user whose id is in `ids`, in no particular order.
    /// Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn find_users(&self, ids: &[RecordId]) -> Result<Vec<User>, StoreError>;

    /// All users sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Replaces a user's name and email. `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Validation`] if the draft breaks the schema
    /// - [`StoreError::Duplicate`] if the email belongs to another user
    async fn update_user(
        &self,
        id: &RecordId,
        draft: UserDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    /// Deletes a user, returning the removed record. `None` if absent.
    ///
    /// Does not touch event registrant lists; see
    /// [`EventRepository::remove_registrant_everywhere`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn delete_user(&self, id: &RecordId) -> Result<Option<User>, StoreError>;
}

/// Persistent storage for events and their registrant lists.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Stores a new event with no registrants.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the draft breaks the schema.
    async fn insert_event(&self, draft: EventDraft, now: DateTime<Utc>) -> Result<Event, StoreError>;

    /// Loads an event by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn find_event(&self, id: &RecordId) -> Result<Option<Event>, StoreError>;

    /// Events strictly after `now`, sorted by date then location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError>;

    /// Events whose registrant list contains `user_id`, sorted by date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn list_for_registrant(&self, user_id: &RecordId) -> Result<Vec<Event>, StoreError>;

    /// Atomically appends `user_id` to the event's registrant list if the
    /// event is upcoming, the user is not yet registered, and a place is free.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::EventNotFound`]
    /// - [`RegistrationError::PastEvent`]
    /// - [`RegistrationError::AlreadyRegistered`]
    /// - [`RegistrationError::EventFull`]
    /// - [`RegistrationError::Store`] on storage failure
    async fn register_attendee(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError>;

    /// Atomically removes the first occurrence of `user_id` from the
    /// event's registrant list.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::EventNotFound`]
    /// - [`RegistrationError::NotRegistered`]
    /// - [`RegistrationError::Store`] on storage failure
    async fn cancel_registration(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError>;

    /// Pulls `user_id` out of every registrant list. Returns the number of
    /// events changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage failure.
    async fn remove_registrant_everywhere(
        &self,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Verifies the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if it is not.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
