//! # Registrar Testing
//!
//! Testing utilities for the event registration service.
//!
//! This crate provides:
//! - [`InMemoryRepository`]: `HashMap`-backed users and events with the same
//!   atomic registration semantics as the Postgres backend
//! - [`FixedClock`]: deterministic time
//! - Fixture helpers for drafts
//!
//! ## Example
//!
//! ```
//! use registrar_testing::{InMemoryRepository, test_clock, helpers};
//! use registrar_core::{Clock, EventRepository, UserRepository, registration};
//! use chrono::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = InMemoryRepository::new();
//! let clock = test_clock();
//!
//! let user = repo.insert_user(helpers::user_draft("ada"), clock.now()).await?;
//! let event = repo
//!     .insert_event(helpers::event_draft("Meetup", clock.now() + Duration::days(1), 1), clock.now())
//!     .await?;
//!
//! let event = registration::register(&repo, &repo, &event.id, &user.id, clock.now()).await?;
//! assert_eq!(event.remaining_capacity(), 0);
//! # Ok(())
//! # }
//! ```

mod repository;

use chrono::{DateTime, Utc};
use registrar_core::environment::Clock;

pub use repository::InMemoryRepository;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use registrar_testing::mocks::FixedClock;
    /// use registrar_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2030-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Draft builders for tests.
pub mod helpers {
    use chrono::{DateTime, Utc};
    use registrar_core::{EventDraft, UserDraft};

    /// A valid user draft whose email is derived from `handle`.
    #[must_use]
    pub fn user_draft(handle: &str) -> UserDraft {
        UserDraft::new(handle, &format!("{handle}@example.com"))
    }

    /// A valid event draft at a fixed location.
    #[must_use]
    pub fn event_draft(title: &str, date_time: DateTime<Utc>, capacity: u32) -> EventDraft {
        EventDraft::new(title, date_time, "Main Hall", capacity)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
