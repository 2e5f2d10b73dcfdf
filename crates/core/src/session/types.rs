//! Types for game sessions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifecycle::PendingTicket;
use crate::score::ScoreState;
use crate::ticket::{LostTicket, Ticket};

/// Errors returned by session control operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session is not in a status that allows the operation.
    #[error("invalid session state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// A caller-supplied value was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SessionError {
    pub(crate) fn invalid_state(expected: &str, actual: SessionStatus) -> Self {
        SessionError::InvalidState {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, never started.
    #[default]
    Idle,
    Running,
    Paused,
    Ended,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Paused => "paused",
            SessionStatus::Ended => "ended",
        }
    }

    /// Whether `start` may be called.
    pub fn can_start(&self) -> bool {
        matches!(self, SessionStatus::Idle | SessionStatus::Ended)
    }

    /// Running or paused.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub tickets_limit: usize,
    pub pending: Vec<PendingTicket>,
    pub processed: Vec<Ticket>,
    pub lost: Vec<LostTicket>,
    pub expired: Vec<Ticket>,
    pub score: ScoreState,
}
