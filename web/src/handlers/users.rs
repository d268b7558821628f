//! User API endpoints.
//!
//! - POST /api/users - Create a user
//! - GET /api/users - List users sorted by name
//! - GET /api/users/:id - Get user details
//! - PUT /api/users/:id - Replace name and email
//! - DELETE /api/users/:id - Delete a user and pull them from every event
//! - GET /api/users/:id/events - Events the user is registered for

use crate::error::AppError;
use crate::extractors::{RecordIdPath, ValidatedJson};
use crate::handlers::events::EventSummary;
use crate::metrics;
use crate::state::AppState;
use crate::validation::UserRequest;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use registrar_core::{RecordId, User};
use serde::Serialize;

// ============================================================================
// Response Types
// ============================================================================

/// Full user representation.
#[derive(Debug, Serialize)]
pub struct UserView {
    /// User ID
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Short user representation used inside other resources.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Response after creating or updating a user.
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    /// Success message
    pub message: &'static str,
    /// The stored user
    pub user: UserView,
}

/// Response for listing users.
#[derive(Debug, Serialize)]
pub struct UserList {
    /// Number of users
    pub count: usize,
    /// Users sorted by name
    pub users: Vec<UserView>,
}

/// Response after deleting a user.
#[derive(Debug, Serialize)]
pub struct DeletedUser {
    /// Success message
    pub message: &'static str,
    /// ID of the removed user
    pub deleted_user_id: RecordId,
    /// Cascade note
    pub note: &'static str,
}

/// Events a user is registered for.
#[derive(Debug, Serialize)]
pub struct RegisteredEvents {
    /// Number of events
    pub count: usize,
    /// Events sorted by date
    pub registered_events: Vec<EventSummary>,
}

/// Response for a user's registrations.
#[derive(Debug, Serialize)]
pub struct UserEvents {
    /// The user
    pub user: UserSummary,
    /// Their events
    pub events: RegisteredEvents,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a user.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5002/api/users \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Ada Lovelace", "email": "ada@example.com"}'
/// ```
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(draft): ValidatedJson<UserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    let user = state.users.insert_user(draft, state.now()).await?;

    tracing::info!(user_id = %user.id, "User created");
    metrics::record_user_created();

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User created successfully",
            user: user.into(),
        }),
    ))
}

/// Get user details by ID.
pub async fn get_user(
    State(state): State<AppState>,
    RecordIdPath(user_id): RecordIdPath,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .users
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

/// List all users sorted by name.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserList>, AppError> {
    let users: Vec<UserView> = state
        .users
        .list_users()
        .await?
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(Json(UserList {
        count: users.len(),
        users,
    }))
}

/// Replace a user's name and email.
pub async fn update_user(
    State(state): State<AppState>,
    RecordIdPath(user_id): RecordIdPath,
    ValidatedJson(draft): ValidatedJson<UserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user = state
        .users
        .update_user(&user_id, draft, state.now())
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    tracing::info!(user_id = %user.id, "User updated");

    Ok(Json(UserEnvelope {
        message: "User updated successfully",
        user: user.into(),
    }))
}

/// Delete a user and remove them from every event's registrant list.
///
/// The user delete and the registrant pull are two separate writes. A
/// failure between them leaves dangling ids, which event views skip.
pub async fn delete_user(
    State(state): State<AppState>,
    RecordIdPath(user_id): RecordIdPath,
) -> Result<Json<DeletedUser>, AppError> {
    state
        .users
        .delete_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let removed = state
        .events
        .remove_registrant_everywhere(&user_id, state.now())
        .await?;

    tracing::info!(user_id = %user_id, registrations_removed = removed, "User deleted");
    metrics::record_user_deleted(removed);

    Ok(Json(DeletedUser {
        message: "User deleted successfully",
        deleted_user_id: user_id,
        note: "User has been removed from all event registrations",
    }))
}

/// Events the user is registered for, sorted by date.
pub async fn user_events(
    State(state): State<AppState>,
    RecordIdPath(user_id): RecordIdPath,
) -> Result<Json<UserEvents>, AppError> {
    let user = state
        .users
        .find_user(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let now = state.now();
    let registered_events: Vec<EventSummary> = state
        .events
        .list_for_registrant(&user_id)
        .await?
        .iter()
        .map(|event| EventSummary::at(event, now))
        .collect();

    Ok(Json(UserEvents {
        user: user.into(),
        events: RegisteredEvents {
            count: registered_events.len(),
            registered_events,
        },
    }))
}
