use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, sessions, tickets, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Sessions
        .route(
            "/sessions",
            post(sessions::create_session).get(sessions::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/{id}/start", post(sessions::start_session))
        .route("/sessions/{id}/pause", post(sessions::pause_session))
        .route("/sessions/{id}/resume", post(sessions::resume_session))
        .route("/sessions/{id}/end", post(sessions::end_session))
        .route("/sessions/{id}/tickets-limit", put(sessions::set_tickets_limit))
        .route("/sessions/{id}/viewport", put(sessions::set_viewport))
        // Tickets
        .route(
            "/sessions/{id}/tickets/{ticket_id}/categorize",
            post(tickets::categorize_ticket),
        )
        // Live events
        .route("/sessions/{id}/ws", get(ws::ws_handler))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
