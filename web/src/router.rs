//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints and layers.

use crate::handlers::{self, events, route_not_found, users};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// Configures:
/// - Health checks (`/health`, `/ready`)
/// - User endpoints under `/api/users`
/// - Event and registration endpoints under `/api/events`
/// - A JSON 404 for unmatched routes, including a known path with an
///   unsupported method
/// - Request tracing, permissive CORS, and correlation IDs
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Users
        .route(
            "/users",
            post(users::create_user)
                .get(users::list_users)
                .fallback(route_not_found),
        )
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user)
                .fallback(route_not_found),
        )
        .route("/users/:id/events", get(users::user_events).fallback(route_not_found))
        // Events
        .route(
            "/events",
            post(events::create_event)
                .get(events::list_events)
                .fallback(route_not_found),
        )
        .route("/events/:id", get(events::get_event).fallback(route_not_found))
        .route(
            "/events/:id/register",
            post(events::register)
                .delete(events::cancel_registration)
                .fallback(route_not_found),
        )
        .route("/events/:id/stats", get(events::event_stats).fallback(route_not_found));

    Router::new()
        .route("/health", get(handlers::health_check).fallback(route_not_found))
        .route("/ready", get(handlers::readiness_check).fallback(route_not_found))
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
