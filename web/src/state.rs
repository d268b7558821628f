//! Application state for Axum handlers.

use chrono::{DateTime, Utc};
use registrar_core::{Clock, EventRepository, UserRepository};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Repositories and the clock are trait objects, so the same router serves
/// the Postgres backend in production and the in-memory backend in tests.
///
/// # Examples
///
/// ```ignore
/// use registrar_web::AppState;
/// use registrar_core::SystemClock;
/// use std::sync::Arc;
///
/// let state = AppState::from_repository(repository, Arc::new(SystemClock));
/// let app = registrar_web::build_router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    /// User storage
    pub users: Arc<dyn UserRepository>,
    /// Event storage
    pub events: Arc<dyn EventRepository>,
    /// Time source for past-event checks and timestamps
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            events,
            clock,
        }
    }

    /// Create state over a single backend that stores both users and events.
    #[must_use]
    pub fn from_repository<R>(repository: R, clock: Arc<dyn Clock>) -> Self
    where
        R: UserRepository + EventRepository + 'static,
    {
        let repository = Arc::new(repository);
        Self::new(repository.clone(), repository, clock)
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }
}
