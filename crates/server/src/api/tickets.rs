//! Ticket API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ticketrush_core::{Category, ScoreState, Ticket, TicketId, Transition};

use super::error::{api_error, session_error, ApiError};
use super::extract::{ApiJson, ApiPath};
use super::sessions::find_session;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for dropping a ticket into a zone
#[derive(Debug, Deserialize)]
pub struct CategorizeBody {
    /// Zone the ticket was dropped into ("bug", "feature", "technical", "support")
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizeOutcome {
    Processed,
    Lost,
    /// The ticket was not pending anymore
    Ignored,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub outcome: CategorizeOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_category: Option<Category>,
    pub score: ScoreState,
}

// ============================================================================
// Handlers
// ============================================================================

/// Categorize a pending ticket
pub async fn categorize_ticket(
    State(state): State<Arc<AppState>>,
    ApiPath((session_id, ticket_id)): ApiPath<(String, u64)>,
    ApiJson(body): ApiJson<CategorizeBody>,
) -> Result<Json<CategorizeResponse>, ApiError> {
    let category: Category = body
        .category
        .parse()
        .map_err(|e: ticketrush_core::UnknownCategory| {
            api_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let session = find_session(&state, &session_id).await?;
    let transition = session
        .categorize(TicketId(ticket_id), category)
        .await
        .map_err(session_error)?;
    let score = session.score().await;

    let response = match transition {
        Some(Transition::Processed { ticket }) => CategorizeResponse {
            outcome: CategorizeOutcome::Processed,
            ticket: Some(ticket),
            selected_category: None,
            score,
        },
        Some(Transition::Lost { ticket }) => CategorizeResponse {
            outcome: CategorizeOutcome::Lost,
            selected_category: Some(ticket.selected_category),
            ticket: Some(ticket.ticket),
            score,
        },
        // Expiry only happens on the countdown
        Some(Transition::Expired { .. }) | None => CategorizeResponse {
            outcome: CategorizeOutcome::Ignored,
            ticket: None,
            selected_category: None,
            score,
        },
    };

    Ok(Json(response))
}
