//! Game session implementation.
//!
//! A session owns one lifecycle store and one score board behind a single
//! async mutex. Timers run as spawned tasks:
//! - Arrivals: one loop topping up pending after random delays
//! - Countdowns: one loop per pending ticket, ticking down to expiry
//!
//! Every task takes the lock for its read-modify-write, and every removal
//! path aborts the timers it makes obsolete. Tasks only hold a weak
//! reference, so dropping the session stops them.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::config::{GameConfig, ScoringConfig};
use crate::lifecycle::{CountdownTick, TicketLifecycle, Transition};
use crate::metrics::{SESSION_FINAL_SCORE, SESSION_OPERATIONS};
use crate::score::{ScoreBoard, ScoreChange, ScoreState};
use crate::ticket::{Category, TicketId};

use super::events::{EventBroadcaster, GameEvent, GameEventEnvelope};
use super::types::{SessionError, SessionSnapshot, SessionStatus};

/// One independent game: tickets, score and timers.
pub struct GameSession {
    shared: Arc<Shared>,
}

struct Shared {
    game: GameConfig,
    tick_interval: Duration,
    events: EventBroadcaster,
    inner: Mutex<SessionInner>,
}

struct SessionInner {
    status: SessionStatus,
    lifecycle: TicketLifecycle,
    score: ScoreBoard,
    rng: StdRng,
    countdowns: HashMap<TicketId, AbortHandle>,
    arrivals: Option<AbortHandle>,
}

impl GameSession {
    /// Create an idle session.
    ///
    /// With `game.seed` set, ticket contents and arrival delays are
    /// reproducible.
    pub fn new(game: GameConfig, scoring: ScoringConfig) -> Self {
        let rng = match game.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let inner = SessionInner {
            status: SessionStatus::Idle,
            lifecycle: TicketLifecycle::new(&game),
            score: ScoreBoard::new(scoring),
            rng,
            countdowns: HashMap::new(),
            arrivals: None,
        };

        Self {
            shared: Arc::new(Shared {
                tick_interval: Duration::from_millis(game.countdown_tick_ms),
                game,
                events: EventBroadcaster::default(),
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEventEnvelope> {
        self.shared.events.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        self.shared.inner.lock().await.status
    }

    pub async fn score(&self) -> ScoreState {
        self.shared.inner.lock().await.score.state()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.shared.inner.lock().await;
        SessionSnapshot {
            status: inner.status,
            tickets_limit: inner.lifecycle.tickets_limit(),
            pending: inner.lifecycle.pending().to_vec(),
            processed: inner.lifecycle.processed().to_vec(),
            lost: inner.lifecycle.lost().to_vec(),
            expired: inner.lifecycle.expired().to_vec(),
            score: inner.score.state(),
        }
    }

    // ------------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------------

    /// Start a fresh game: clear tickets and score, add the first ticket
    /// immediately and begin arrivals.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut guard = self.shared.inner.lock().await;
        let inner = &mut *guard;
        if !inner.status.can_start() {
            return Err(SessionError::invalid_state("idle or ended", inner.status));
        }

        inner.cancel_timers();
        inner.lifecycle.reset();
        inner.score.reset();
        inner.status = SessionStatus::Running;

        info!(
            tickets_limit = inner.lifecycle.tickets_limit(),
            difficulty = ?self.shared.game.difficulty,
            "Game session started"
        );
        SESSION_OPERATIONS.with_label_values(&["start"]).inc();
        self.shared.events.publish(GameEvent::SessionStarted);

        self.shared.start_arrivals(inner);
        Ok(())
    }

    /// Freeze the game. Countdowns keep their remaining time.
    pub async fn pause(&self) -> Result<(), SessionError> {
        let mut guard = self.shared.inner.lock().await;
        let inner = &mut *guard;
        if inner.status != SessionStatus::Running {
            return Err(SessionError::invalid_state("running", inner.status));
        }

        inner.cancel_timers();
        inner.status = SessionStatus::Paused;

        info!(pending = inner.lifecycle.pending().len(), "Game session paused");
        SESSION_OPERATIONS.with_label_values(&["pause"]).inc();
        self.shared.events.publish(GameEvent::SessionPaused);
        Ok(())
    }

    /// Continue a paused game. Countdowns pick up where they stopped and a
    /// ticket arrives immediately.
    pub async fn resume(&self) -> Result<(), SessionError> {
        let mut guard = self.shared.inner.lock().await;
        let inner = &mut *guard;
        if inner.status != SessionStatus::Paused {
            return Err(SessionError::invalid_state("paused", inner.status));
        }

        inner.status = SessionStatus::Running;
        let ids: Vec<TicketId> = inner.lifecycle.pending().iter().map(|p| p.id()).collect();
        for id in ids {
            let handle = self.shared.spawn_countdown(id);
            inner.countdowns.insert(id, handle);
        }

        info!(pending = inner.countdowns.len(), "Game session resumed");
        SESSION_OPERATIONS.with_label_values(&["resume"]).inc();
        self.shared.events.publish(GameEvent::SessionResumed);

        self.shared.start_arrivals(inner);
        Ok(())
    }

    /// Stop the game for good and publish the final score.
    pub async fn end(&self) -> Result<ScoreState, SessionError> {
        let mut guard = self.shared.inner.lock().await;
        let inner = &mut *guard;
        if !inner.status.is_active() {
            return Err(SessionError::invalid_state("running or paused", inner.status));
        }

        inner.cancel_timers();
        inner.status = SessionStatus::Ended;
        let score = inner.score.state();
        let counts = inner.lifecycle.counts();

        info!(
            score = score.current_score,
            best_streak = score.best_streak,
            processed = counts.processed,
            lost = counts.lost,
            expired = counts.expired,
            left_pending = counts.pending,
            "Game session ended"
        );
        SESSION_OPERATIONS.with_label_values(&["end"]).inc();
        SESSION_FINAL_SCORE
            .with_label_values(&[])
            .observe(score.current_score as f64);
        self.shared.events.publish(GameEvent::SessionEnded { score });
        Ok(score)
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    /// Drop ticket `id` into the `target` zone.
    ///
    /// Returns `Ok(None)` when the ticket is not pending (already resolved or
    /// unknown); the request is ignored.
    pub async fn categorize(
        &self,
        id: TicketId,
        target: Category,
    ) -> Result<Option<Transition>, SessionError> {
        let mut guard = self.shared.inner.lock().await;
        let inner = &mut *guard;
        if inner.status != SessionStatus::Running {
            return Err(SessionError::invalid_state("running", inner.status));
        }

        let Some(transition) = inner.lifecycle.categorize(id, target) else {
            warn!(ticket_id = %id, category = %target, "Ignoring categorization of ticket that is not pending");
            return Ok(None);
        };

        if let Some(handle) = inner.countdowns.remove(&id) {
            handle.abort();
        }
        inner.settle(&self.shared.events, &transition);
        Ok(Some(transition))
    }

    /// Change the pending cap. Tickets already pending stay.
    pub async fn set_tickets_limit(&self, limit: usize) -> Result<(), SessionError> {
        if limit == 0 {
            return Err(SessionError::InvalidInput(
                "tickets limit must be greater than 0".to_string(),
            ));
        }

        let mut inner = self.shared.inner.lock().await;
        if inner.lifecycle.tickets_limit() != limit {
            inner.lifecycle.set_tickets_limit(limit);
            debug!(limit, "Tickets limit changed");
            self.shared
                .events
                .publish(GameEvent::TicketsLimitChanged { limit });
        }
        Ok(())
    }

    /// Apply the limit for a client viewport `width` pixels wide. Returns the
    /// limit now in effect.
    pub async fn set_viewport_width(&self, width: u32) -> Result<usize, SessionError> {
        let limit = self.shared.game.limit_for_viewport(width);
        self.set_tickets_limit(limit).await?;
        Ok(limit)
    }
}

impl Shared {
    /// Add a ticket now and spawn the arrival loop for the following ones.
    fn start_arrivals(self: &Arc<Self>, inner: &mut SessionInner) {
        let delay = self.add_ticket(inner);
        inner.arrivals = Some(self.spawn_arrivals(delay));
    }

    /// Try to add one ticket, arming its countdown. Returns the delay until
    /// the next attempt.
    fn add_ticket(self: &Arc<Self>, inner: &mut SessionInner) -> Duration {
        if let Some(ticket) = inner.lifecycle.add_ticket(&mut inner.rng) {
            let handle = self.spawn_countdown(ticket.id);
            inner.countdowns.insert(ticket.id, handle);
            self.events.publish(GameEvent::TicketCreated { ticket });
        }
        inner.lifecycle.time_till_next()
    }

    fn spawn_arrivals(self: &Arc<Self>, first_delay: Duration) -> AbortHandle {
        let shared: Weak<Shared> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut delay = first_delay;
            loop {
                tokio::time::sleep(delay).await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let mut guard = shared.inner.lock().await;
                let inner = &mut *guard;
                if inner.status != SessionStatus::Running {
                    break;
                }
                delay = shared.add_ticket(inner);
            }
        })
        .abort_handle()
    }

    fn spawn_countdown(self: &Arc<Self>, id: TicketId) -> AbortHandle {
        let shared: Weak<Shared> = Arc::downgrade(self);
        let tick = self.tick_interval;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tick).await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                if !shared.countdown_step(id).await {
                    break;
                }
            }
        })
        .abort_handle()
    }

    /// One countdown tick for `id`. Returns whether the countdown goes on.
    async fn countdown_step(&self, id: TicketId) -> bool {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        if inner.status != SessionStatus::Running {
            return false;
        }

        match inner.lifecycle.tick(id) {
            CountdownTick::Running { remaining_secs } => {
                self.events.publish(GameEvent::CountdownTick {
                    ticket_id: id,
                    remaining_secs,
                });
                true
            }
            CountdownTick::Expired(ticket) => {
                inner.countdowns.remove(&id);
                inner.settle(&self.events, &Transition::Expired { ticket });
                false
            }
            CountdownTick::NotPending => {
                inner.countdowns.remove(&id);
                false
            }
        }
    }
}

impl SessionInner {
    /// Score a transition and publish what happened.
    fn settle(&mut self, events: &EventBroadcaster, transition: &Transition) {
        let change = self.score.apply(transition);
        let score = self.score.state().current_score;
        let ticket_id = transition.ticket_id();

        let points = match change {
            ScoreChange::Awarded { points } | ScoreChange::Penalized { points } => points,
        };

        let event = match transition {
            Transition::Processed { .. } => GameEvent::TicketProcessed {
                ticket_id,
                points,
                score,
            },
            Transition::Lost { ticket } => GameEvent::TicketLost {
                ticket_id,
                category: ticket.ticket.category,
                selected_category: ticket.selected_category,
                penalty: points,
                score,
            },
            Transition::Expired { .. } => GameEvent::TicketExpired {
                ticket_id,
                penalty: points,
                score,
            },
        };
        debug!(
            ticket_id = %ticket_id,
            outcome = %transition.status(),
            score,
            "Ticket resolved"
        );
        events.publish(event);

        if transition.is_success() && self.score.at_streak_milestone() {
            let streak = self.score.state().streak;
            info!(streak, "Streak milestone reached");
            events.publish(GameEvent::StreakMilestone { streak });
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.arrivals.take() {
            handle.abort();
        }
        for (_, handle) in self.countdowns.drain() {
            handle.abort();
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(
            GameConfig {
                seed: Some(7),
                spawn_delay_min_ms: 60_000,
                spawn_delay_max_ms: 60_000,
                ..Default::default()
            },
            ScoringConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_is_idle_and_empty() {
        let session = session();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Idle);
        assert!(snapshot.pending.is_empty());
        assert_eq!(snapshot.tickets_limit, 12);
        assert_eq!(snapshot.score.current_score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_adds_first_ticket_immediately() {
        let session = session();
        session.start().await.unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.status, SessionStatus::Running);
        assert_eq!(snapshot.pending.len(), 1);
        assert_eq!(snapshot.pending[0].ticket.id, TicketId(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transitions_are_rejected() {
        let session = session();

        assert!(matches!(
            session.pause().await,
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            session.resume().await,
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            session.end().await,
            Err(SessionError::InvalidState { .. })
        ));
        assert!(matches!(
            session.categorize(TicketId(1), Category::Bug).await,
            Err(SessionError::InvalidState { .. })
        ));

        tokio_test::assert_ok!(session.start().await);
        assert_eq!(
            session.start().await,
            Err(SessionError::InvalidState {
                expected: "idle or ended".to_string(),
                actual: "running".to_string(),
            })
        );
        let err = tokio_test::assert_err!(session.resume().await);
        assert_eq!(err, SessionError::invalid_state("paused", SessionStatus::Running));
    }

    #[tokio::test(start_paused = true)]
    async fn test_categorize_while_paused_is_rejected() {
        let session = session();
        session.start().await.unwrap();
        session.pause().await.unwrap();

        let err = session
            .categorize(TicketId(1), Category::Bug)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::invalid_state("running", SessionStatus::Paused));
        assert_eq!(session.snapshot().await.pending.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_categorize_unknown_ticket_is_ignored() {
        let session = session();
        session.start().await.unwrap();

        let result = session.categorize(TicketId(99), Category::Bug).await.unwrap();
        assert!(result.is_none());
        assert_eq!(session.score().await.wrong_answers, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_is_invalid_input() {
        let session = session();
        assert!(matches!(
            session.set_tickets_limit(0).await,
            Err(SessionError::InvalidInput(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_width_selects_limit() {
        let session = session();
        assert_eq!(session.set_viewport_width(500).await.unwrap(), 3);
        assert_eq!(session.snapshot().await.tickets_limit, 3);
        assert_eq!(session.set_viewport_width(1024).await.unwrap(), 12);
        assert_eq!(session.snapshot().await.tickets_limit, 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_end_resets() {
        let session = session();
        session.start().await.unwrap();
        let first = session.snapshot().await.pending[0].clone();
        session
            .categorize(first.id(), first.ticket.category)
            .await
            .unwrap();
        assert_eq!(session.score().await.current_score, 100);

        let final_score = session.end().await.unwrap();
        assert_eq!(final_score.current_score, 100);

        session.start().await.unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.score.current_score, 0);
        assert!(snapshot.processed.is_empty());
        assert_eq!(snapshot.pending.len(), 1);
        assert_eq!(snapshot.pending[0].ticket.id, TicketId(1));
    }
}
