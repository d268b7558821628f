//! In-memory repository.
//!
//! Implements both [`UserRepository`] and [`EventRepository`] over
//! `HashMap`s. Each event write (append, removal, bulk pull) runs under a
//! single write lock, matching the single-statement atomicity of the
//! Postgres backend.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use registrar_core::{
    Event, EventDraft, EventRepository, RecordId, RegistrationError, StoreError, User, UserDraft,
    UserRepository,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory user and event storage for fast, deterministic testing.
///
/// Cloning shares the underlying maps.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<RecordId, User>>>,
    events: Arc<RwLock<HashMap<RecordId, Event>>>,
}

impl InMemoryRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.read().unwrap().len()
    }

    /// Number of stored events
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.read().unwrap().len()
    }

    /// Stores an event as-is, bypassing schema checks and the conditional
    /// append. Lets tests set up states such as overfilled or past events.
    pub fn put_event(&self, event: Event) {
        self.events.write().unwrap().insert(event.id, event);
    }

    fn email_taken(users: &HashMap<RecordId, User>, email: &str, except: Option<&RecordId>) -> bool {
        users
            .values()
            .any(|user| user.email == email && Some(&user.id) != except)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, draft: UserDraft, now: DateTime<Utc>) -> Result<User, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let mut users = self.users.write().unwrap();
        if Self::email_taken(&users, &draft.email, None) {
            return Err(StoreError::Duplicate(format!("email {}", draft.email)));
        }
        let user = User::create(draft, now);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_users(&self, ids: &[RecordId]) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().unwrap();
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().unwrap().values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn update_user(
        &self,
        id: &RecordId,
        draft: UserDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let mut users = self.users.write().unwrap();
        if !users.contains_key(id) {
            return Ok(None);
        }
        if Self::email_taken(&users, &draft.email, Some(id)) {
            return Err(StoreError::Duplicate(format!("email {}", draft.email)));
        }
        Ok(users.get_mut(id).map(|user| {
            user.apply(draft, now);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        Ok(self.users.write().unwrap().remove(id))
    }
}

#[async_trait]
impl EventRepository for InMemoryRepository {
    async fn insert_event(&self, draft: EventDraft, now: DateTime<Utc>) -> Result<Event, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let event = Event::create(draft, now);
        self.events.write().unwrap().insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: &RecordId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().unwrap().get(id).cloned())
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .unwrap()
            .values()
            .filter(|event| event.date_time > now)
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.date_time
                .cmp(&b.date_time)
                .then_with(|| a.location.cmp(&b.location))
        });
        Ok(events)
    }

    async fn list_for_registrant(&self, user_id: &RecordId) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .unwrap()
            .values()
            .filter(|event| event.is_registered(user_id))
            .cloned()
            .collect();
        events.sort_by_key(|event| event.date_time);
        Ok(events)
    }

    async fn register_attendee(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError> {
        let mut events = self.events.write().unwrap();
        let event = events
            .get_mut(event_id)
            .ok_or(RegistrationError::EventNotFound)?;
        event.admit(*user_id, now)?;
        Ok(event.clone())
    }

    async fn cancel_registration(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError> {
        let mut events = self.events.write().unwrap();
        let event = events
            .get_mut(event_id)
            .ok_or(RegistrationError::EventNotFound)?;
        event.withdraw(user_id, now)?;
        Ok(event.clone())
    }

    async fn remove_registrant_everywhere(
        &self,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut changed = 0;
        for event in self.events.write().unwrap().values_mut() {
            let before = event.registrations.len();
            event.registrations.retain(|id| id != user_id);
            if event.registrations.len() != before {
                event.updated_at = now;
                changed += 1;
            }
        }
        tracing::debug!(user_id = %user_id, changed, "Pulled registrant from events");
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{helpers, test_clock};
    use chrono::Duration;
    use registrar_core::Clock;

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        repo.insert_user(helpers::user_draft("ada"), now).await.unwrap();

        let err = repo
            .insert_user(UserDraft::new("Other", "ada@example.com"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_update_may_keep_own_email() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        let user = repo.insert_user(helpers::user_draft("ada"), now).await.unwrap();

        let updated = repo
            .update_user(&user.id, UserDraft::new("Ada L.", "ada@example.com"), now)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Ada L.");
    }

    #[tokio::test]
    async fn test_schema_violation_surfaces_as_validation() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        let err = repo
            .insert_event(helpers::event_draft("", now, 0), now)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Validation(vec![
                "title is required".to_string(),
                "capacity must be between 1 and 1000".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_upcoming_sorted_by_date_then_location() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        let later = now + Duration::days(2);
        let sooner = now + Duration::days(1);

        repo.insert_event(EventDraft::new("B", later, "Zeta", 5), now).await.unwrap();
        repo.insert_event(EventDraft::new("A", later, "Alpha", 5), now).await.unwrap();
        repo.insert_event(EventDraft::new("C", sooner, "Mid", 5), now).await.unwrap();
        repo.insert_event(EventDraft::new("Old", now - Duration::days(1), "Any", 5), now)
            .await
            .unwrap();

        let titles: Vec<String> = repo
            .list_upcoming(now)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_register_classifies_refusals() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        let user = RecordId::new();

        assert_eq!(
            repo.register_attendee(&RecordId::new(), &user, now).await,
            Err(RegistrationError::EventNotFound)
        );

        let past = repo
            .insert_event(helpers::event_draft("Past", now - Duration::hours(1), 5), now)
            .await
            .unwrap();
        assert_eq!(
            repo.register_attendee(&past.id, &user, now).await,
            Err(RegistrationError::PastEvent)
        );

        let event = repo
            .insert_event(helpers::event_draft("Next", now + Duration::hours(1), 1), now)
            .await
            .unwrap();
        repo.register_attendee(&event.id, &user, now).await.unwrap();
        assert_eq!(
            repo.register_attendee(&event.id, &user, now).await,
            Err(RegistrationError::AlreadyRegistered)
        );
        assert_eq!(
            repo.register_attendee(&event.id, &RecordId::new(), now).await,
            Err(RegistrationError::EventFull)
        );
    }

    #[tokio::test]
    async fn test_remove_registrant_everywhere() {
        let repo = InMemoryRepository::new();
        let now = test_clock().now();
        let user = RecordId::new();
        let other = RecordId::new();

        let a = repo
            .insert_event(helpers::event_draft("A", now + Duration::days(1), 5), now)
            .await
            .unwrap();
        let b = repo
            .insert_event(helpers::event_draft("B", now + Duration::days(2), 5), now)
            .await
            .unwrap();
        repo.register_attendee(&a.id, &user, now).await.unwrap();
        repo.register_attendee(&a.id, &other, now).await.unwrap();
        repo.register_attendee(&b.id, &other, now).await.unwrap();

        assert_eq!(repo.remove_registrant_everywhere(&user, now).await.unwrap(), 1);

        let a = repo.find_event(&a.id).await.unwrap().unwrap();
        assert_eq!(a.registrations, vec![other]);
        assert!(repo.list_for_registrant(&user).await.unwrap().is_empty());
        assert_eq!(repo.list_for_registrant(&other).await.unwrap().len(), 2);
    }
}
