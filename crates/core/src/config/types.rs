use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum number of concurrently hosted game sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_max_sessions() -> usize {
    64
}

/// How tickets are drawn by the generator.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Every priority is equally likely.
    #[default]
    Normal,
    /// Priorities lean towards major and critical (short countdowns).
    Hard,
}

/// Game rules for a single session.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameConfig {
    /// Pending cap on wide viewports.
    #[serde(default = "default_tickets_limit")]
    pub tickets_limit: usize,

    /// Pending cap on viewports narrower than `compact_viewport_width`.
    #[serde(default = "default_compact_tickets_limit")]
    pub compact_tickets_limit: usize,

    /// Viewport width (pixels) below which the compact limit applies.
    #[serde(default = "default_compact_viewport_width")]
    pub compact_viewport_width: u32,

    /// Lower bound of the random delay between two ticket arrivals (milliseconds).
    #[serde(default = "default_spawn_delay_min")]
    pub spawn_delay_min_ms: u64,

    /// Upper bound of the random delay between two ticket arrivals (milliseconds).
    #[serde(default = "default_spawn_delay_max")]
    pub spawn_delay_max_ms: u64,

    /// Length of one countdown step (milliseconds). One step removes one second
    /// from a pending ticket's budget.
    #[serde(default = "default_countdown_tick")]
    pub countdown_tick_ms: u64,

    #[serde(default)]
    pub difficulty: Difficulty,

    /// Fixed RNG seed. When unset every session seeds from the OS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_tickets_limit() -> usize {
    12
}

fn default_compact_tickets_limit() -> usize {
    3
}

fn default_compact_viewport_width() -> u32 {
    768
}

fn default_spawn_delay_min() -> u64 {
    2000
}

fn default_spawn_delay_max() -> u64 {
    5000
}

fn default_countdown_tick() -> u64 {
    1000
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tickets_limit: default_tickets_limit(),
            compact_tickets_limit: default_compact_tickets_limit(),
            compact_viewport_width: default_compact_viewport_width(),
            spawn_delay_min_ms: default_spawn_delay_min(),
            spawn_delay_max_ms: default_spawn_delay_max(),
            countdown_tick_ms: default_countdown_tick(),
            difficulty: Difficulty::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Pending cap for a viewport of the given width.
    pub fn limit_for_viewport(&self, width: u32) -> usize {
        if width < self.compact_viewport_width {
            self.compact_tickets_limit
        } else {
            self.tickets_limit
        }
    }
}

/// Score engine constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Points for a correct categorization at multiplier 1.
    #[serde(default = "default_base_points")]
    pub base_points: u64,

    /// Multiplier gained per consecutive success.
    #[serde(default = "default_multiplier_step")]
    pub multiplier_step: f64,

    /// Points removed on a lost or expired ticket (score floors at 0).
    #[serde(default = "default_failure_penalty")]
    pub failure_penalty: u64,

    /// A milestone event is published every this many consecutive successes.
    /// 0 disables milestones.
    #[serde(default = "default_streak_milestone")]
    pub streak_milestone: u32,
}

fn default_base_points() -> u64 {
    100
}

fn default_multiplier_step() -> f64 {
    0.1
}

fn default_failure_penalty() -> u64 {
    100
}

fn default_streak_milestone() -> u32 {
    5
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: default_base_points(),
            multiplier_step: default_multiplier_step(),
            failure_penalty: default_failure_penalty(),
            streak_milestone: default_streak_milestone(),
        }
    }
}
