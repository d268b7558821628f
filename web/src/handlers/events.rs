//! Event API endpoints.
//!
//! - POST /api/events - Create an event
//! - GET /api/events - List upcoming events
//! - GET /api/events/:id - Event details with populated registrants
//! - POST /api/events/:id/register - Register a user
//! - DELETE /api/events/:id/register - Cancel a registration
//! - GET /api/events/:id/stats - Occupancy statistics

use crate::error::AppError;
use crate::extractors::{RecordIdPath, ValidatedJson};
use crate::handlers::users::UserSummary;
use crate::metrics;
use crate::state::AppState;
use crate::validation::{EventRequest, RegistrationRequest};
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use registrar_core::{Event, EventStatus, Occupancy, RecordId, User, registration};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Response Types
// ============================================================================

/// Event with derived fields, as listed under a user.
#[derive(Debug, Serialize)]
pub struct EventSummary {
    /// Event ID
    pub id: RecordId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub date_time: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of registrants
    pub capacity: u32,
    /// Places left
    pub remaining_capacity: i64,
    /// Percentage full
    pub capacity_percentage: f64,
    /// Derived status
    pub event_status: EventStatus,
    /// Human-readable date
    pub formatted_date: String,
}

impl EventSummary {
    /// Summarize `event` as seen at `now`.
    #[must_use]
    pub fn at(event: &Event, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            date_time: event.date_time,
            location: event.location.clone(),
            capacity: event.capacity,
            remaining_capacity: event.remaining_capacity(),
            capacity_percentage: event.capacity_percentage(),
            event_status: event.status_at(now),
            formatted_date: event.formatted_date(),
        }
    }
}

/// Event entry in the upcoming-events list.
#[derive(Debug, Serialize)]
pub struct EventListing {
    /// Event ID
    pub id: RecordId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub date_time: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of registrants
    pub capacity: u32,
    /// Number of registrants
    pub total_registrations: usize,
    /// Places left
    pub remaining_capacity: i64,
    /// Percentage full
    pub capacity_percentage: f64,
    /// Derived status
    pub event_status: EventStatus,
    /// Human-readable date
    pub formatted_date: String,
}

impl EventListing {
    fn at(event: &Event, now: DateTime<Utc>) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            date_time: event.date_time,
            location: event.location.clone(),
            capacity: event.capacity,
            total_registrations: event.registration_count(),
            remaining_capacity: event.remaining_capacity(),
            capacity_percentage: event.capacity_percentage(),
            event_status: event.status_at(now),
            formatted_date: event.formatted_date(),
        }
    }
}

/// Full event representation with registrants populated.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    /// Event ID
    pub id: RecordId,
    /// Event title
    pub title: String,
    /// When the event takes place
    pub date_time: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Maximum number of registrants
    pub capacity: u32,
    /// Registrants in registration order
    pub registrations: Vec<UserSummary>,
    /// Places left
    pub remaining_capacity: i64,
    /// Percentage full
    pub capacity_percentage: f64,
    /// Derived status
    pub event_status: EventStatus,
    /// Human-readable date
    pub formatted_date: String,
}

impl EventDetail {
    /// Build the detail view. Registrants whose user no longer exists are
    /// skipped; the rest keep registration order.
    fn at(event: Event, registrants: Vec<User>, now: DateTime<Utc>) -> Self {
        let mut by_id: HashMap<RecordId, User> =
            registrants.into_iter().map(|user| (user.id, user)).collect();
        let registrations = event
            .registrations
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(UserSummary::from)
            .collect();

        Self {
            remaining_capacity: event.remaining_capacity(),
            capacity_percentage: event.capacity_percentage(),
            event_status: event.status_at(now),
            formatted_date: event.formatted_date(),
            id: event.id,
            title: event.title,
            date_time: event.date_time,
            location: event.location,
            capacity: event.capacity,
            registrations,
        }
    }
}

/// Response after creating an event.
#[derive(Debug, Serialize)]
pub struct CreatedEvent {
    /// Success message
    pub message: &'static str,
    /// Created event ID
    pub event_id: RecordId,
    /// The stored event
    pub event: EventDetail,
}

/// Response for listing upcoming events.
#[derive(Debug, Serialize)]
pub struct EventList {
    /// Number of events
    pub count: usize,
    /// Events sorted by date then location
    pub events: Vec<EventListing>,
}

/// Response after a registration change.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    /// Success message
    pub message: &'static str,
    /// Event ID
    pub event_id: RecordId,
    /// User ID
    pub user_id: RecordId,
    /// Updated fill level
    #[serde(flatten)]
    pub occupancy: Occupancy,
}

/// Occupancy statistics for one event.
#[derive(Debug, Serialize)]
pub struct EventStats {
    /// Event ID
    pub event_id: RecordId,
    /// Event title
    pub title: String,
    /// Number of registrants
    pub total_registrations: usize,
    /// Places left
    pub remaining_capacity: i64,
    /// Percentage full
    pub capacity_percentage: f64,
    /// Derived status
    pub event_status: EventStatus,
    /// Human-readable date
    pub formatted_date: String,
    /// Whether the event already started
    pub is_past_event: bool,
    /// Whether every place is taken
    pub is_full: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an event.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5002/api/events \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "Rust Meetup",
///     "date_time": "2030-06-01T18:00:00Z",
///     "location": "Hall A",
///     "capacity": 50
///   }'
/// ```
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(draft): ValidatedJson<EventRequest>,
) -> Result<(StatusCode, Json<CreatedEvent>), AppError> {
    let now = state.now();
    let event = state.events.insert_event(draft, now).await?;

    tracing::info!(event_id = %event.id, capacity = event.capacity, "Event created");
    metrics::record_event_created();

    Ok((
        StatusCode::CREATED,
        Json(CreatedEvent {
            message: "Event created successfully",
            event_id: event.id,
            event: EventDetail::at(event, Vec::new(), now),
        }),
    ))
}

/// Get event details by ID, with registrants as `{id, name, email}`.
pub async fn get_event(
    State(state): State<AppState>,
    RecordIdPath(event_id): RecordIdPath,
) -> Result<Json<EventDetail>, AppError> {
    let event = state
        .events
        .find_event(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let registrants = state.users.find_users(&event.registrations).await?;

    Ok(Json(EventDetail::at(event, registrants, state.now())))
}

/// List upcoming events sorted by date then location.
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventList>, AppError> {
    let now = state.now();
    let events: Vec<EventListing> = state
        .events
        .list_upcoming(now)
        .await?
        .iter()
        .map(|event| EventListing::at(event, now))
        .collect();

    Ok(Json(EventList {
        count: events.len(),
        events,
    }))
}

/// Register a user for an event.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5002/api/events/65f1c2a9e4b0a1b2c3d4e5f6/register \
///   -H "Content-Type: application/json" \
///   -d '{"user_id": "65f1c2a9e4b0a1b2c3d4e5f7"}'
/// ```
pub async fn register(
    State(state): State<AppState>,
    RecordIdPath(event_id): RecordIdPath,
    ValidatedJson(user_id): ValidatedJson<RegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let now = state.now();
    let result = registration::register(
        state.users.as_ref(),
        state.events.as_ref(),
        &event_id,
        &user_id,
        now,
    )
    .await;
    metrics::record_registration(metrics::outcome(&result));
    let event = result?;

    tracing::info!(event_id = %event_id, user_id = %user_id, "User registered for event");

    Ok(Json(RegistrationResponse {
        message: "Registration successful",
        event_id,
        user_id,
        occupancy: event.occupancy_at(now),
    }))
}

/// Cancel a user's registration.
pub async fn cancel_registration(
    State(state): State<AppState>,
    RecordIdPath(event_id): RecordIdPath,
    ValidatedJson(user_id): ValidatedJson<RegistrationRequest>,
) -> Result<Json<RegistrationResponse>, AppError> {
    let now = state.now();
    let result = registration::cancel(state.events.as_ref(), &event_id, &user_id, now).await;
    metrics::record_cancellation(metrics::outcome(&result));
    let event = result?;

    tracing::info!(event_id = %event_id, user_id = %user_id, "Registration cancelled");

    Ok(Json(RegistrationResponse {
        message: "Registration cancelled successfully",
        event_id,
        user_id,
        occupancy: event.occupancy_at(now),
    }))
}

/// Occupancy statistics for an event.
pub async fn event_stats(
    State(state): State<AppState>,
    RecordIdPath(event_id): RecordIdPath,
) -> Result<Json<EventStats>, AppError> {
    let event = state
        .events
        .find_event(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let now = state.now();
    Ok(Json(EventStats {
        event_id: event.id,
        total_registrations: event.registration_count(),
        remaining_capacity: event.remaining_capacity(),
        capacity_percentage: event.capacity_percentage(),
        event_status: event.status_at(now),
        formatted_date: event.formatted_date(),
        is_past_event: event.is_past_at(now),
        is_full: event.is_full(),
        title: event.title,
    }))
}
