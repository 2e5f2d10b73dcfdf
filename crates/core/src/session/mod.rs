//! Game sessions: one running game with its tickets, score and timers.

mod events;
mod runner;
mod types;

pub use events::{EventBroadcaster, GameEvent, GameEventEnvelope};
pub use runner::GameSession;
pub use types::{SessionError, SessionSnapshot, SessionStatus};
