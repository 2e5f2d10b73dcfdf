//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket generation and lifecycle transitions
//! - Scoring
//! - Game sessions

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Tickets
// =============================================================================

/// Tickets generated by category and priority.
pub static TICKETS_GENERATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketrush_tickets_generated_total", "Total tickets generated"),
        &["category", "priority"],
    )
    .unwrap()
});

/// Tickets leaving pending, by outcome.
pub static TICKET_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketrush_ticket_transitions_total",
            "Total ticket lifecycle transitions",
        ),
        &["outcome"], // "processed", "lost", "expired"
    )
    .unwrap()
});

// =============================================================================
// Scoring
// =============================================================================

/// Points awarded for correct categorizations.
pub static POINTS_AWARDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("ticketrush_points_awarded_total", "Total points awarded").unwrap()
});

// =============================================================================
// Sessions
// =============================================================================

/// Session lifecycle operations by kind.
pub static SESSION_OPERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketrush_session_operations_total",
            "Total session control operations",
        ),
        &["operation"], // "start", "pause", "resume", "end"
    )
    .unwrap()
});

/// Final score of ended sessions.
pub static SESSION_FINAL_SCORE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketrush_session_final_score",
            "Distribution of scores at session end",
        )
        .buckets(vec![0.0, 100.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 25000.0]),
        &[],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Tickets
        Box::new(TICKETS_GENERATED.clone()),
        Box::new(TICKET_TRANSITIONS.clone()),
        // Scoring
        Box::new(POINTS_AWARDED.clone()),
        // Sessions
        Box::new(SESSION_OPERATIONS.clone()),
        Box::new(SESSION_FINAL_SCORE.clone()),
    ]
}
