pub mod config;
pub mod lifecycle;
pub mod metrics;
pub mod score;
pub mod session;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, Difficulty,
    GameConfig, ScoringConfig, ServerConfig,
};
pub use lifecycle::{CountdownTick, LifecycleCounts, PendingTicket, TicketLifecycle, Transition};
pub use score::{ScoreBoard, ScoreChange, ScoreState};
pub use session::{
    EventBroadcaster, GameEvent, GameEventEnvelope, GameSession, SessionError, SessionSnapshot,
    SessionStatus,
};
pub use ticket::{
    Category, LostTicket, Priority, Ticket, TicketGenerator, TicketId, TicketStatus,
    UnknownCategory,
};
