use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0 and at least one session is allowed
/// - Ticket limits are positive and the compact limit fits inside the regular one
/// - Arrival delays are positive and ordered, and the countdown step is positive
/// - Scoring constants are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }
    if config.server.max_sessions == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_sessions must be at least 1".to_string(),
        ));
    }

    // Game validation
    let game = &config.game;
    if game.tickets_limit == 0 || game.compact_tickets_limit == 0 {
        return Err(ConfigError::ValidationError(
            "game ticket limits must be at least 1".to_string(),
        ));
    }
    if game.compact_tickets_limit > game.tickets_limit {
        return Err(ConfigError::ValidationError(format!(
            "game.compact_tickets_limit ({}) exceeds game.tickets_limit ({})",
            game.compact_tickets_limit, game.tickets_limit
        )));
    }
    if game.spawn_delay_min_ms == 0 {
        return Err(ConfigError::ValidationError(
            "game.spawn_delay_min_ms cannot be 0".to_string(),
        ));
    }
    if game.spawn_delay_min_ms > game.spawn_delay_max_ms {
        return Err(ConfigError::ValidationError(format!(
            "game.spawn_delay_min_ms ({}) is greater than game.spawn_delay_max_ms ({})",
            game.spawn_delay_min_ms, game.spawn_delay_max_ms
        )));
    }
    if game.countdown_tick_ms == 0 {
        return Err(ConfigError::ValidationError(
            "game.countdown_tick_ms cannot be 0".to_string(),
        ));
    }

    // Scoring validation
    let scoring = &config.scoring;
    if scoring.base_points == 0 {
        return Err(ConfigError::ValidationError(
            "scoring.base_points cannot be 0".to_string(),
        ));
    }
    if !scoring.multiplier_step.is_finite() || scoring.multiplier_step < 0.0 {
        return Err(ConfigError::ValidationError(
            "scoring.multiplier_step must be a non-negative number".to_string(),
        ));
    }

    Ok(())
}
