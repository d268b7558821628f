//! Business metrics for the registration service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `registrar_users_created_total` - Users created
//! - `registrar_users_deleted_total` - Users deleted
//! - `registrar_events_created_total` - Events created
//! - `registrar_registrations_total{outcome}` - Registration attempts by outcome
//! - `registrar_cancellations_total{outcome}` - Cancellation attempts by outcome
//!
//! Recording is a no-op until a recorder (the Prometheus exporter in the
//! server binary) is installed.

use metrics::describe_counter;
use registrar_core::RegistrationError;

/// Outcome label for a successful registration change.
pub const OUTCOME_SUCCESS: &str = "success";

/// Register all metric descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!("registrar_users_created_total", "Total number of users created");
    describe_counter!("registrar_users_deleted_total", "Total number of users deleted");
    describe_counter!("registrar_events_created_total", "Total number of events created");
    describe_counter!(
        "registrar_registrations_total",
        "Registration attempts by outcome (success, event_full, past_event, ...)"
    );
    describe_counter!(
        "registrar_cancellations_total",
        "Cancellation attempts by outcome (success, not_registered, ...)"
    );

    tracing::info!("Business metrics registered");
}

/// Record a user created.
pub fn record_user_created() {
    metrics::counter!("registrar_users_created_total").increment(1);
}

/// Record a user deleted, with the number of events it was pulled from.
pub fn record_user_deleted(registrations_removed: u64) {
    metrics::counter!("registrar_users_deleted_total").increment(1);
    tracing::debug!(registrations_removed, "Recorded user_deleted metric");
}

/// Record an event created.
pub fn record_event_created() {
    metrics::counter!("registrar_events_created_total").increment(1);
}

/// Label for a registration-change result.
#[must_use]
pub const fn outcome<T>(result: &Result<T, RegistrationError>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_SUCCESS,
        Err(err) => err.outcome(),
    }
}

/// Record a registration attempt.
pub fn record_registration(outcome: &'static str) {
    metrics::counter!("registrar_registrations_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded registration metric");
}

/// Record a cancellation attempt.
pub fn record_cancellation(outcome: &'static str) {
    metrics::counter!("registrar_cancellations_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded cancellation metric");
}
