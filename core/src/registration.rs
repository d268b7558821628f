//! Registering users for events and cancelling registrations.
//!
//! # Flow
//!
//! ```text
//! register(event, user)
//!   ├─ user exists?                      no → UserNotFound
//!   └─ conditional append (one write)
//!        ├─ event exists?                no → EventNotFound
//!        ├─ date_time ≥ now?             no → PastEvent
//!        ├─ user not yet registered?     no → AlreadyRegistered
//!        └─ registrations < capacity?    no → EventFull
//! ```
//!
//! The user lookup and the append are separate operations; a user deleted
//! in between leaves a dangling id that the delete cascade or event
//! population skips.

use crate::event::Event;
use crate::id::RecordId;
use crate::repository::{EventRepository, StoreError, UserRepository};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a registration change was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// The event does not exist.
    #[error("Event not found")]
    EventNotFound,

    /// The event already started.
    #[error("Cannot register for past events")]
    PastEvent,

    /// The user is already in the registrant list.
    #[error("User already registered for this event")]
    AlreadyRegistered,

    /// Every place is taken.
    #[error("Event is full")]
    EventFull,

    /// The user is not in the registrant list.
    #[error("User not registered for this event")]
    NotRegistered,

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// Short label used for logs and metrics.
    #[must_use]
    pub const fn outcome(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::EventNotFound => "event_not_found",
            Self::PastEvent => "past_event",
            Self::AlreadyRegistered => "already_registered",
            Self::EventFull => "event_full",
            Self::NotRegistered => "not_registered",
            Self::Store(_) => "store_error",
        }
    }
}

/// Registers `user_id` for `event_id`.
///
/// # Errors
///
/// See the module-level flow; the first failed check is returned.
#[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
pub async fn register(
    users: &dyn UserRepository,
    events: &dyn EventRepository,
    event_id: &RecordId,
    user_id: &RecordId,
    now: DateTime<Utc>,
) -> Result<Event, RegistrationError> {
    if users.find_user(user_id).await?.is_none() {
        return Err(RegistrationError::UserNotFound);
    }

    let event = events.register_attendee(event_id, user_id, now).await?;
    tracing::debug!(
        remaining_capacity = event.remaining_capacity(),
        "Registration stored"
    );
    Ok(event)
}

/// Cancels `user_id`'s registration for `event_id`.
///
/// # Errors
///
/// - [`RegistrationError::EventNotFound`]
/// - [`RegistrationError::NotRegistered`]
/// - [`RegistrationError::Store`] on storage failure
#[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
pub async fn cancel(
    events: &dyn EventRepository,
    event_id: &RecordId,
    user_id: &RecordId,
    now: DateTime<Utc>,
) -> Result<Event, RegistrationError> {
    let event = events.cancel_registration(event_id, user_id, now).await?;
    tracing::debug!(
        remaining_capacity = event.remaining_capacity(),
        "Registration cancelled"
    );
    Ok(event)
}

/// Classifies why a conditional append touched no record.
///
/// `current` is the event as re-read after the failed write. If it now
/// admits the user, a concurrent cancellation freed the slot after the
/// write was evaluated; the write saw the event full at that moment.
#[must_use]
pub fn classify_refused_registration(
    current: Option<&Event>,
    user_id: &RecordId,
    now: DateTime<Utc>,
) -> RegistrationError {
    match current {
        None => RegistrationError::EventNotFound,
        Some(event) => event
            .check_registration(user_id, now)
            .err()
            .unwrap_or(RegistrationError::EventFull),
    }
}

/// Classifies why a conditional removal touched no record.
#[must_use]
pub const fn classify_refused_cancellation(current: Option<&Event>) -> RegistrationError {
    match current {
        None => RegistrationError::EventNotFound,
        Some(_) => RegistrationError::NotRegistered,
    }
}
