//! Database row types and their conversion into domain entities.

use chrono::{DateTime, Utc};
use registrar_core::{Event, RecordId, StoreError, User};

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub registrations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_id(value: &str) -> Result<RecordId, StoreError> {
    value
        .parse()
        .map_err(|e| StoreError::InvalidId(format!("{value}: {e}")))
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&row.id)?,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let capacity = u32::try_from(row.capacity)
            .map_err(|_| StoreError::Database(format!("Negative capacity on event {}", row.id)))?;
        let registrations = row
            .registrations
            .iter()
            .map(|id| parse_id(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: parse_id(&row.id)?,
            title: row.title,
            date_time: row.date_time,
            location: row.location,
            capacity,
            registrations,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Maps sqlx failures onto the storage error taxonomy.
///
/// Unique violations (23505) become [`StoreError::Duplicate`] and check
/// violations (23514) become [`StoreError::Validation`], each naming the
/// offending constraint.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        if db_err.is_unique_violation() {
            return StoreError::Duplicate(constraint);
        }
        if db_err.is_check_violation() {
            return StoreError::Validation(vec![format!("constraint {constraint} violated")]);
        }
    }
    StoreError::Database(err.to_string())
}
