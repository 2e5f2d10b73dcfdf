//! Session API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use ticketrush_core::{Difficulty, GameSession, ScoreState, SessionSnapshot, SessionStatus};

use super::error::{api_error, session_error, session_not_found, ApiError};
use super::extract::{ApiJson, ApiPath};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a session. Every field falls back to the
/// server configuration, and the body itself may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSessionBody {
    /// Client viewport width in pixels, selects the tickets limit
    pub viewport_width: Option<u32>,
    pub difficulty: Option<Difficulty>,
    /// Seed for reproducible tickets
    pub seed: Option<u64>,
}

/// Request body for changing the tickets limit
#[derive(Debug, Deserialize)]
pub struct TicketsLimitBody {
    pub limit: usize,
}

/// Request body for reporting the viewport width
#[derive(Debug, Deserialize)]
pub struct ViewportBody {
    pub width: u32,
}

/// A session with its full state
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

/// Short form used in listings
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub status: SessionStatus,
    pub score: ScoreState,
}

#[derive(Debug, Serialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TicketsLimitResponse {
    pub tickets_limit: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new idle session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<ApiJson<CreateSessionBody>>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let body = body.map(|ApiJson(b)| b).unwrap_or_default();
    let mut game = state.config().game.clone();
    if let Some(difficulty) = body.difficulty {
        game.difficulty = difficulty;
    }
    if body.seed.is_some() {
        game.seed = body.seed;
    }

    let (id, session) = state.create_session(game).await.map_err(|e| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("session limit reached ({})", e.max_sessions),
        )
    })?;

    if let Some(width) = body.viewport_width {
        session
            .set_viewport_width(width)
            .await
            .map_err(session_error)?;
    }

    let snapshot = session.snapshot().await;
    Ok((StatusCode::CREATED, Json(SessionResponse { id, snapshot })))
}

/// List all sessions
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<ListSessionsResponse> {
    let mut sessions = Vec::new();
    for (id, session) in state.list_sessions().await {
        let snapshot = session.snapshot().await;
        sessions.push(SessionSummary {
            id,
            status: snapshot.status,
            score: snapshot.score,
        });
    }

    let total = sessions.len();
    Json(ListSessionsResponse { sessions, total })
}

/// Get a session snapshot
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    respond(id, &session).await
}

/// End (if active) and discard a session
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .remove_session(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;

    if session.status().await.is_active() {
        // Still publishes the final score to any connected client
        let _ = session.end().await;
    }
    info!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    session.start().await.map_err(session_error)?;
    respond(id, &session).await
}

pub async fn pause_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    session.pause().await.map_err(session_error)?;
    respond(id, &session).await
}

pub async fn resume_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    session.resume().await.map_err(session_error)?;
    respond(id, &session).await
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    session.end().await.map_err(session_error)?;
    respond(id, &session).await
}

/// Set the tickets limit directly
pub async fn set_tickets_limit(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<TicketsLimitBody>,
) -> Result<Json<TicketsLimitResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    session
        .set_tickets_limit(body.limit)
        .await
        .map_err(session_error)?;
    Ok(Json(TicketsLimitResponse {
        tickets_limit: body.limit,
    }))
}

/// Derive the tickets limit from the client viewport
pub async fn set_viewport(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<ViewportBody>,
) -> Result<Json<TicketsLimitResponse>, ApiError> {
    let session = find_session(&state, &id).await?;
    let tickets_limit = session
        .set_viewport_width(body.width)
        .await
        .map_err(session_error)?;
    Ok(Json(TicketsLimitResponse { tickets_limit }))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) async fn find_session(
    state: &AppState,
    id: &str,
) -> Result<Arc<GameSession>, ApiError> {
    state.session(id).await.ok_or_else(|| session_not_found(id))
}

async fn respond(id: String, session: &GameSession) -> Result<Json<SessionResponse>, ApiError> {
    let snapshot = session.snapshot().await;
    Ok(Json(SessionResponse { id, snapshot }))
}
