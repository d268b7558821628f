//! `PostgreSQL` implementation of the repository traits.

use crate::rows::{EventRow, UserRow, store_error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use registrar_core::registration::{classify_refused_cancellation, classify_refused_registration};
use registrar_core::{
    Event, EventDraft, EventRepository, RecordId, RegistrationError, StoreError, User, UserDraft,
    UserRepository,
};
use sqlx::PgPool;

/// `PostgreSQL` user and event repository.
///
/// Every registration change is a single conditional `UPDATE`, so two
/// requests racing for the last place cannot both succeed.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a repository over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the embedded database migrations.
    ///
    /// Creates the `users` and `events` tables if they don't already exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

fn into_users(rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
    rows.into_iter().map(User::try_from).collect()
}

fn into_events(rows: Vec<EventRow>) -> Result<Vec<Event>, StoreError> {
    rows.into_iter().map(Event::try_from).collect()
}

#[async_trait]
impl UserRepository for PostgresRepository {
    #[tracing::instrument(skip_all, fields(email = %draft.email))]
    async fn insert_user(&self, draft: UserDraft, now: DateTime<Utc>) -> Result<User, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let user = User::create(draft, now);
        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, created_at, updated_at
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        tracing::debug!(user_id = %user.id, "User inserted");
        row.try_into()
    }

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_users(&self, ids: &[RecordId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_users(rows)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_users(rows)
    }

    #[tracing::instrument(skip_all, fields(user_id = %id))]
    async fn update_user(
        &self,
        id: &RecordId,
        draft: UserDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let row: Option<UserRow> = sqlx::query_as(
            r"
            UPDATE users
            SET name = $2, email = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, name, email, created_at, updated_at
            ",
        )
        .bind(id.to_string())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, fields(user_id = %id))]
    async fn delete_user(&self, id: &RecordId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "DELETE FROM users WHERE id = $1 RETURNING id, name, email, created_at, updated_at",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl EventRepository for PostgresRepository {
    #[tracing::instrument(skip_all, fields(title = %draft.title))]
    async fn insert_event(&self, draft: EventDraft, now: DateTime<Utc>) -> Result<Event, StoreError> {
        StoreError::check_schema(draft.schema_violations())?;

        let event = Event::create(draft, now);
        let capacity = i32::try_from(event.capacity).map_err(|_| {
            StoreError::Validation(vec!["capacity must be between 1 and 1000".to_string()])
        })?;
        let row: EventRow = sqlx::query_as(
            r"
            INSERT INTO events (id, title, date_time, location, capacity, registrations, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, '{}', $6, $7)
            RETURNING id, title, date_time, location, capacity, registrations, created_at, updated_at
            ",
        )
        .bind(event.id.to_string())
        .bind(&event.title)
        .bind(event.date_time)
        .bind(&event.location)
        .bind(capacity)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        tracing::debug!(event_id = %event.id, "Event inserted");
        row.try_into()
    }

    async fn find_event(&self, id: &RecordId) -> Result<Option<Event>, StoreError> {
        let row: Option<EventRow> = sqlx::query_as(
            r"
            SELECT id, title, date_time, location, capacity, registrations, created_at, updated_at
            FROM events
            WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(Event::try_from).transpose()
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"
            SELECT id, title, date_time, location, capacity, registrations, created_at, updated_at
            FROM events
            WHERE date_time > $1
            ORDER BY date_time, location
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_events(rows)
    }

    async fn list_for_registrant(&self, user_id: &RecordId) -> Result<Vec<Event>, StoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"
            SELECT id, title, date_time, location, capacity, registrations, created_at, updated_at
            FROM events
            WHERE $1 = ANY(registrations)
            ORDER BY date_time
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        into_events(rows)
    }

    #[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
    async fn register_attendee(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError> {
        let row: Option<EventRow> = sqlx::query_as(
            r"
            UPDATE events
            SET registrations = array_append(registrations, $2), updated_at = $3
            WHERE id = $1
              AND date_time >= $3
              AND NOT ($2 = ANY(registrations))
              AND cardinality(registrations) < capacity
            RETURNING id, title, date_time, location, capacity, registrations, created_at, updated_at
            ",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        if let Some(row) = row {
            return Ok(Event::try_from(row)?);
        }

        let current = self.find_event(event_id).await?;
        let refusal = classify_refused_registration(current.as_ref(), user_id, now);
        tracing::debug!(outcome = refusal.outcome(), "Registration refused");
        Err(refusal)
    }

    #[tracing::instrument(skip_all, fields(event_id = %event_id, user_id = %user_id))]
    async fn cancel_registration(
        &self,
        event_id: &RecordId,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<Event, RegistrationError> {
        // Splices out the first occurrence only
        let row: Option<EventRow> = sqlx::query_as(
            r"
            UPDATE events
            SET registrations = registrations[1:array_position(registrations, $2) - 1]
                             || registrations[array_position(registrations, $2) + 1:],
                updated_at = $3
            WHERE id = $1
              AND $2 = ANY(registrations)
            RETURNING id, title, date_time, location, capacity, registrations, created_at, updated_at
            ",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        if let Some(row) = row {
            return Ok(Event::try_from(row)?);
        }

        let current = self.find_event(event_id).await?;
        Err(classify_refused_cancellation(current.as_ref()))
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn remove_registrant_everywhere(
        &self,
        user_id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r"
            UPDATE events
            SET registrations = array_remove(registrations, $1), updated_at = $2
            WHERE $1 = ANY(registrations)
            ",
        )
        .bind(user_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        tracing::debug!(changed = result.rows_affected(), "Pulled registrant from events");
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}
