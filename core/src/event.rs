//! Event entity and its derived fields.
//!
//! Only `capacity`, `date_time`, and the registrant list are stored; every
//! figure a client sees about fill level or status is computed here on
//! demand and never persisted.
//!
//! # Derived fields
//!
//! | Field                 | Rule                                              |
//! |-----------------------|---------------------------------------------------|
//! | `remaining_capacity`  | `capacity − registrations`                        |
//! | `capacity_percentage` | `registrations / capacity × 100`, two decimals    |
//! | `event_status`        | `past` if before now, else `full` if at capacity, else `open` |
//! | `formatted_date`      | long-form English date, e.g. `Friday, December 20, 2030 at 06:00 PM` |

use crate::id::RecordId;
use crate::registration::RegistrationError;
use crate::validation::{MAX_CAPACITY, MAX_TEXT_LEN, MIN_CAPACITY, char_len};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduled occurrence with finite capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier
    pub id: RecordId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub date_time: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of registrants
    pub capacity: u32,
    /// Registered user ids in registration order
    pub registrations: Vec<RecordId>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
    /// When the event was last modified
    pub updated_at: DateTime<Utc>,
}

/// Status derived from time and fill level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event's start time is before now
    Past,
    /// Upcoming and at (or above) capacity
    Full,
    /// Upcoming with free places
    Open,
}

impl EventStatus {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Full => "full",
            Self::Open => "open",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fill-level figures returned after every registration change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Occupancy {
    /// `capacity − registrations`
    pub remaining_capacity: i64,
    /// Percentage full, two decimals
    pub capacity_percentage: f64,
    /// Derived status
    pub event_status: EventStatus,
}

impl Event {
    /// Builds a new event from a draft with an empty registrant list.
    #[must_use]
    pub fn create(draft: EventDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            title: draft.title,
            date_time: draft.date_time,
            location: draft.location,
            capacity: draft.capacity,
            registrations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of registered users.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Places left. Negative only if the capacity invariant was broken by a
    /// writer that bypassed the conditional update.
    #[must_use]
    pub fn remaining_capacity(&self) -> i64 {
        let taken = i64::try_from(self.registrations.len()).unwrap_or(i64::MAX);
        i64::from(self.capacity) - taken
    }

    /// Percentage of capacity taken, rounded to two decimals.
    #[must_use]
    pub fn capacity_percentage(&self) -> f64 {
        if self.capacity == 0 {
            return 100.0;
        }
        let taken = f64::from(u32::try_from(self.registrations.len()).unwrap_or(u32::MAX));
        round_to_hundredths(taken / f64::from(self.capacity) * 100.0)
    }

    /// Whether the event started before `now`.
    #[must_use]
    pub fn is_past_at(&self, now: DateTime<Utc>) -> bool {
        self.date_time < now
    }

    /// Whether every place is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.remaining_capacity() <= 0
    }

    /// Whether `user_id` is in the registrant list.
    #[must_use]
    pub fn is_registered(&self, user_id: &RecordId) -> bool {
        self.registrations.contains(user_id)
    }

    /// Status as observed at `now`. Past wins over full.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        if self.is_past_at(now) {
            EventStatus::Past
        } else if self.is_full() {
            EventStatus::Full
        } else {
            EventStatus::Open
        }
    }

    /// Long-form English rendering of `date_time` in UTC.
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.date_time
            .format("%A, %B %-d, %Y at %I:%M %p")
            .to_string()
    }

    /// Remaining capacity, percentage, and status in one value.
    #[must_use]
    pub fn occupancy_at(&self, now: DateTime<Utc>) -> Occupancy {
        Occupancy {
            remaining_capacity: self.remaining_capacity(),
            capacity_percentage: self.capacity_percentage(),
            event_status: self.status_at(now),
        }
    }

    /// Checks whether `user_id` may register at `now`.
    ///
    /// Conditions are evaluated in a fixed order and the first failure wins:
    /// past event, already registered, full.
    ///
    /// # Errors
    ///
    /// Returns the rejection for the first failed condition.
    pub fn check_registration(
        &self,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<(), RegistrationError> {
        if self.is_past_at(now) {
            return Err(RegistrationError::PastEvent);
        }
        if self.is_registered(user_id) {
            return Err(RegistrationError::AlreadyRegistered);
        }
        if self.is_full() {
            return Err(RegistrationError::EventFull);
        }
        Ok(())
    }

    /// Checks whether `user_id` holds a registration that can be cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotRegistered`] if the user is absent.
    pub fn check_cancellation(&self, user_id: &RecordId) -> Result<(), RegistrationError> {
        if self.is_registered(user_id) {
            Ok(())
        } else {
            Err(RegistrationError::NotRegistered)
        }
    }

    /// Appends `user_id` after [`check_registration`](Self::check_registration) passes.
    ///
    /// # Errors
    ///
    /// Returns the rejection from `check_registration`; the event is unchanged.
    pub fn admit(&mut self, user_id: RecordId, now: DateTime<Utc>) -> Result<(), RegistrationError> {
        self.check_registration(&user_id, now)?;
        self.registrations.push(user_id);
        self.updated_at = now;
        Ok(())
    }

    /// Removes the first occurrence of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotRegistered`] if the user is absent.
    pub fn withdraw(&mut self, user_id: &RecordId, now: DateTime<Utc>) -> Result<(), RegistrationError> {
        let position = self
            .registrations
            .iter()
            .position(|id| id == user_id)
            .ok_or(RegistrationError::NotRegistered)?;
        self.registrations.remove(position);
        self.updated_at = now;
        Ok(())
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Input for creating an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDraft {
    /// Event title (trimmed)
    pub title: String,
    /// When the event takes place
    pub date_time: DateTime<Utc>,
    /// Location (trimmed)
    pub location: String,
    /// Maximum number of registrants
    pub capacity: u32,
}

impl EventDraft {
    /// Creates a draft, trimming the text fields.
    #[must_use]
    pub fn new(title: &str, date_time: DateTime<Utc>, location: &str, capacity: u32) -> Self {
        Self {
            title: title.trim().to_string(),
            date_time,
            location: location.trim().to_string(),
            capacity,
        }
    }

    /// Storage-schema checks. Returns one message per violated rule.
    #[must_use]
    pub fn schema_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for (field, value) in [("title", &self.title), ("location", &self.location)] {
            if value.is_empty() {
                violations.push(format!("{field} is required"));
            } else if char_len(value) > MAX_TEXT_LEN {
                violations.push(format!("{field} must be at most {MAX_TEXT_LEN} characters"));
            }
        }
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.capacity) {
            violations.push(format!(
                "capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}"
            ));
        }
        violations
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    fn event_with(capacity: u32, taken: usize, date_time: DateTime<Utc>) -> Event {
        let mut event = Event::create(EventDraft::new("Meetup", date_time, "Hall A", capacity), now());
        event.registrations = (0..taken).map(|_| RecordId::new()).collect();
        event
    }

    #[test]
    fn test_fresh_event_is_open_and_empty() {
        let event = event_with(10, 0, now() + Duration::days(1));
        assert_eq!(event.remaining_capacity(), 10);
        assert!((event.capacity_percentage() - 0.0).abs() < f64::EPSILON);
        assert_eq!(event.status_at(now()), EventStatus::Open);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        let event = event_with(3, 1, now() + Duration::days(1));
        assert!((event.capacity_percentage() - 33.33).abs() < 1e-9);

        let event = event_with(3, 2, now() + Duration::days(1));
        assert!((event.capacity_percentage() - 66.67).abs() < 1e-9);
    }

    #[test]
    fn test_past_wins_over_full() {
        let event = event_with(1, 1, now() - Duration::minutes(1));
        assert_eq!(event.status_at(now()), EventStatus::Past);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventStatus::Full).unwrap(), "\"full\"");
        assert_eq!(EventStatus::Open.to_string(), "open");
    }

    #[test]
    fn test_formatted_date() {
        let date = Utc.with_ymd_and_hms(2030, 12, 20, 18, 0, 0).unwrap();
        let event = event_with(5, 0, date);
        assert_eq!(event.formatted_date(), "Friday, December 20, 2030 at 06:00 PM");

        let date = Utc.with_ymd_and_hms(2031, 3, 5, 9, 7, 0).unwrap();
        let event = event_with(5, 0, date);
        assert_eq!(event.formatted_date(), "Wednesday, March 5, 2031 at 09:07 AM");
    }

    #[test]
    fn test_registration_checks_in_order() {
        let user = RecordId::new();

        let mut past_and_full = event_with(1, 0, now() - Duration::hours(1));
        past_and_full.registrations.push(user);
        assert_eq!(
            past_and_full.check_registration(&user, now()),
            Err(RegistrationError::PastEvent)
        );

        let mut full_with_user = event_with(1, 0, now() + Duration::hours(1));
        full_with_user.registrations.push(user);
        assert_eq!(
            full_with_user.check_registration(&user, now()),
            Err(RegistrationError::AlreadyRegistered)
        );

        let full = event_with(1, 1, now() + Duration::hours(1));
        assert_eq!(
            full.check_registration(&user, now()),
            Err(RegistrationError::EventFull)
        );
    }

    #[test]
    fn test_admit_up_to_capacity_flips_to_full() {
        let mut event = event_with(2, 0, now() + Duration::days(1));
        event.admit(RecordId::new(), now()).unwrap();
        assert_eq!(event.remaining_capacity(), 1);
        event.admit(RecordId::new(), now()).unwrap();
        assert_eq!(event.remaining_capacity(), 0);
        assert_eq!(event.status_at(now()), EventStatus::Full);

        assert_eq!(
            event.admit(RecordId::new(), now()),
            Err(RegistrationError::EventFull)
        );
        assert_eq!(event.registration_count(), 2);
    }

    #[test]
    fn test_withdraw_removes_first_occurrence_only() {
        let user = RecordId::new();
        let other = RecordId::new();
        let mut event = event_with(5, 0, now() + Duration::days(1));
        event.registrations = vec![user, other, user];
        assert_eq!(event.check_cancellation(&user), Ok(()));

        event.withdraw(&user, now()).unwrap();
        assert_eq!(event.registrations, vec![other, user]);

        assert_eq!(
            event.withdraw(&RecordId::new(), now()),
            Err(RegistrationError::NotRegistered)
        );
    }

    #[test]
    fn test_draft_schema() {
        let draft = EventDraft::new("  ", now(), &"x".repeat(256), 0);
        assert_eq!(
            draft.schema_violations(),
            vec![
                "title is required".to_string(),
                "location must be at most 255 characters".to_string(),
                "capacity must be between 1 and 1000".to_string(),
            ]
        );
        assert!(EventDraft::new("T", now(), "L", 1000).schema_violations().is_empty());
    }

    proptest! {
        #[test]
        fn prop_remaining_is_capacity_minus_count(capacity in 1u32..=1000, fill in 0u32..=1000) {
            let taken = fill.min(capacity) as usize;
            let event = event_with(capacity, taken, now() + Duration::days(1));
            prop_assert_eq!(event.remaining_capacity(), i64::from(capacity) - taken as i64);
        }

        #[test]
        fn prop_percentage_in_range(capacity in 1u32..=1000, fill in 0u32..=1000) {
            let taken = fill.min(capacity) as usize;
            let event = event_with(capacity, taken, now() + Duration::days(1));
            let pct = event.capacity_percentage();
            prop_assert!((0.0..=100.0).contains(&pct));
            let exact = taken as f64 / f64::from(capacity) * 100.0;
            prop_assert!((pct - exact).abs() <= 0.005 + 1e-9);
        }

        #[test]
        fn prop_status_rules(capacity in 1u32..=50, fill in 0u32..=50, offset_minutes in -1000i64..1000) {
            let taken = fill.min(capacity) as usize;
            let date = now() + Duration::minutes(offset_minutes);
            let event = event_with(capacity, taken, date);
            let expected = if date < now() {
                EventStatus::Past
            } else if taken >= capacity as usize {
                EventStatus::Full
            } else {
                EventStatus::Open
            };
            prop_assert_eq!(event.status_at(now()), expected);
        }
    }
}
