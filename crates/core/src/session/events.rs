//! Game events published by a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::score::ScoreState;
use crate::ticket::{Category, Ticket, TicketId};

/// Something that happened in a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted,
    SessionPaused,
    SessionResumed,
    SessionEnded {
        score: ScoreState,
    },

    TicketCreated {
        ticket: Ticket,
    },
    CountdownTick {
        ticket_id: TicketId,
        remaining_secs: u32,
    },
    TicketProcessed {
        ticket_id: TicketId,
        points: u64,
        /// Score after the points were added.
        score: u64,
    },
    TicketLost {
        ticket_id: TicketId,
        category: Category,
        selected_category: Category,
        penalty: u64,
        score: u64,
    },
    TicketExpired {
        ticket_id: TicketId,
        penalty: u64,
        score: u64,
    },

    StreakMilestone {
        streak: u32,
    },
    TicketsLimitChanged {
        limit: usize,
    },
}

impl GameEvent {
    /// The snake_case tag used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::SessionStarted => "session_started",
            GameEvent::SessionPaused => "session_paused",
            GameEvent::SessionResumed => "session_resumed",
            GameEvent::SessionEnded { .. } => "session_ended",
            GameEvent::TicketCreated { .. } => "ticket_created",
            GameEvent::CountdownTick { .. } => "countdown_tick",
            GameEvent::TicketProcessed { .. } => "ticket_processed",
            GameEvent::TicketLost { .. } => "ticket_lost",
            GameEvent::TicketExpired { .. } => "ticket_expired",
            GameEvent::StreakMilestone { .. } => "streak_milestone",
            GameEvent::TicketsLimitChanged { .. } => "tickets_limit_changed",
        }
    }
}

/// Envelope wrapping a game event with the time it was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEventEnvelope {
    pub timestamp: DateTime<Utc>,
    pub event: GameEvent,
}

/// Fan-out of game events to any number of subscribers.
///
/// Cheaply cloneable. Publishing never blocks; subscribers that fall behind
/// the channel capacity miss the oldest events.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<GameEventEnvelope>,
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: GameEvent) {
        let envelope = GameEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        // No receivers is fine
        let _ = self.sender.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
