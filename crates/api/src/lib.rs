//! HTTP API server for the university records system.
//!
//! Provides REST endpoints for students, lecturers and courses, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use record_store::UniversityStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::{courses, lecturers, ops, students};
use state::AppState;

/// Creates the application state over a store.
pub fn create_state<S: UniversityStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}

/// Creates the Axum application router with all routes and shared state.
///
/// Resource routes are nested under `prefix` (already normalized, see
/// [`config::normalize_prefix`]); an empty prefix mounts them at the root.
pub fn create_app<S: UniversityStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    prefix: &str,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(ops::metrics))
        .with_state(metrics_handle);

    let resources = Router::new()
        .route(
            "/students",
            get(students::list::<S>)
                .post(students::create::<S>)
                .put(students::update::<S>),
        )
        .route(
            "/students/{id}",
            get(students::get::<S>).delete(students::delete::<S>),
        )
        .route(
            "/lecturers",
            get(lecturers::list::<S>)
                .post(lecturers::create::<S>)
                .put(lecturers::update::<S>),
        )
        .route(
            "/lecturers/{id}",
            get(lecturers::get::<S>).delete(lecturers::delete::<S>),
        )
        .route(
            "/courses",
            get(courses::list::<S>)
                .post(courses::create::<S>)
                .put(courses::update::<S>),
        )
        .route(
            "/courses/{id}",
            get(courses::get::<S>).delete(courses::delete::<S>),
        )
        .with_state(state);

    let app = Router::new()
        .route("/health", get(ops::health))
        .merge(metrics_router);

    // Nesting at "/" panics, so the root prefix merges instead.
    let app = if prefix.is_empty() {
        app.merge(resources)
    } else {
        app.nest(prefix, resources)
    };

    app.fallback(error::route_not_found)
        .layer(middleware::from_fn(error::error_envelope))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
