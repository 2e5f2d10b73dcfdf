//! Score engine.
//!
//! Scores accumulate per event: each success pays `base_points` times the
//! multiplier held before that success, then grows the streak (and with it the
//! multiplier). Any failure resets streak and multiplier and removes
//! `failure_penalty` points, never going below zero.

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::lifecycle::Transition;
use crate::metrics::POINTS_AWARDED;

/// Player-facing score values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub current_score: u64,
    /// Consecutive successes since the last failure.
    pub streak: u32,
    pub best_streak: u32,
    pub multiplier: f64,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    /// Share of answered tickets that were correct, in `[0, 1]`.
    pub ratio: f64,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            current_score: 0,
            streak: 0,
            best_streak: 0,
            multiplier: 1.0,
            correct_answers: 0,
            wrong_answers: 0,
            ratio: 0.0,
        }
    }
}

/// What a single transition did to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Awarded { points: u64 },
    Penalized { points: u64 },
}

/// Event-accumulated score for one session.
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    config: ScoringConfig,
    current_score: u64,
    streak: u32,
    best_streak: u32,
    correct: u32,
    wrong: u32,
}

impl ScoreBoard {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            current_score: 0,
            streak: 0,
            best_streak: 0,
            correct: 0,
            wrong: 0,
        }
    }

    /// Multiplier applied to the next success.
    pub fn multiplier(&self) -> f64 {
        1.0 + self.streak as f64 * self.config.multiplier_step
    }

    /// Record a correctly categorized ticket. Returns the points earned.
    pub fn record_success(&mut self) -> u64 {
        let points = (self.config.base_points as f64 * self.multiplier()).round() as u64;
        self.current_score = self.current_score.saturating_add(points);
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.correct += 1;
        POINTS_AWARDED.inc_by(points);
        points
    }

    /// Record a lost or expired ticket. Returns the points actually removed.
    pub fn record_failure(&mut self) -> u64 {
        let removed = self.config.failure_penalty.min(self.current_score);
        self.current_score -= removed;
        self.streak = 0;
        self.wrong += 1;
        removed
    }

    /// Update the score for a lifecycle transition.
    pub fn apply(&mut self, transition: &Transition) -> ScoreChange {
        if transition.status().is_failure() {
            ScoreChange::Penalized {
                points: self.record_failure(),
            }
        } else {
            ScoreChange::Awarded {
                points: self.record_success(),
            }
        }
    }

    /// True when the current streak just hit a configured milestone.
    pub fn at_streak_milestone(&self) -> bool {
        let every = self.config.streak_milestone;
        every > 0 && self.streak > 0 && self.streak % every == 0
    }

    pub fn state(&self) -> ScoreState {
        let total = self.correct + self.wrong;
        ScoreState {
            current_score: self.current_score,
            streak: self.streak,
            best_streak: self.best_streak,
            multiplier: self.multiplier(),
            correct_answers: self.correct,
            wrong_answers: self.wrong,
            ratio: if total == 0 {
                0.0
            } else {
                self.correct as f64 / total as f64
            },
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
