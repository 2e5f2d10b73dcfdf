//! The ticket lifecycle store.
//!
//! Holds every ticket of a session in exactly one of four ordered
//! collections. Moving a ticket is always remove-then-insert, and every
//! transition out of pending is a no-op when the ticket is not pending, so
//! the first transition to reach a ticket wins and later ones observe it gone.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::types::{CountdownTick, PendingTicket, Transition};
use crate::config::GameConfig;
use crate::metrics::TICKET_TRANSITIONS;
use crate::ticket::{Category, LostTicket, Ticket, TicketGenerator, TicketId, TicketStatus};

/// Number of tickets per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifecycleCounts {
    pub pending: usize,
    pub processed: usize,
    pub lost: usize,
    pub expired: usize,
}

/// Ticket collections partitioned by status, plus arrival bookkeeping.
#[derive(Debug, Clone)]
pub struct TicketLifecycle {
    generator: TicketGenerator,
    pending: Vec<PendingTicket>,
    processed: Vec<Ticket>,
    lost: Vec<LostTicket>,
    expired: Vec<Ticket>,
    last_id: u64,
    tickets_limit: usize,
    spawn_delay_min: Duration,
    spawn_delay_max: Duration,
    time_till_next: Duration,
}

impl TicketLifecycle {
    /// Create an empty store using the limits and arrival delays of `config`.
    pub fn new(config: &GameConfig) -> Self {
        let spawn_delay_min = Duration::from_millis(config.spawn_delay_min_ms);
        Self {
            generator: TicketGenerator::new(config.difficulty),
            pending: Vec::new(),
            processed: Vec::new(),
            lost: Vec::new(),
            expired: Vec::new(),
            last_id: 0,
            tickets_limit: config.tickets_limit,
            spawn_delay_min,
            spawn_delay_max: Duration::from_millis(config.spawn_delay_max_ms),
            time_till_next: spawn_delay_min,
        }
    }

    // ------------------------------------------------------------------------
    // Arrivals
    // ------------------------------------------------------------------------

    /// Generate the next ticket into pending if there is room.
    ///
    /// The delay before the next arrival is redrawn on every call, including
    /// when the limit is reached and nothing is added.
    pub fn add_ticket<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Ticket> {
        self.time_till_next = self.draw_delay(rng);

        if self.pending.len() >= self.tickets_limit {
            debug!(
                pending = self.pending.len(),
                limit = self.tickets_limit,
                "Tickets limit reached, skipping arrival"
            );
            return None;
        }

        self.last_id += 1;
        let ticket = self.generator.generate(TicketId(self.last_id), rng);
        debug!(
            ticket_id = %ticket.id,
            category = %ticket.category,
            priority = %ticket.priority,
            "Ticket created"
        );
        self.pending.push(PendingTicket::new(ticket.clone()));
        Some(ticket)
    }

    /// Put a hand-built ticket into pending.
    ///
    /// Returns false (and changes nothing) if the limit is reached or the id
    /// is already known to this store. Later generated ids continue after the
    /// highest id seen.
    #[cfg(test)]
    pub(crate) fn insert_pending(&mut self, ticket: Ticket) -> bool {
        if self.pending.len() >= self.tickets_limit || self.status_of(ticket.id).is_some() {
            return false;
        }
        self.last_id = self.last_id.max(ticket.id.0);
        self.pending.push(PendingTicket::new(ticket));
        true
    }

    fn draw_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.spawn_delay_min.as_millis() as u64;
        let max = self.spawn_delay_max.as_millis() as u64;
        if max <= min {
            return self.spawn_delay_min;
        }
        Duration::from_millis(rng.random_range(min..=max))
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Move a pending ticket to processed.
    pub fn set_ticket_to_processed(&mut self, id: TicketId) -> Option<Ticket> {
        let pending = self.take_pending(id)?;
        self.processed.push(pending.ticket.clone());
        record(TicketStatus::Processed);
        Some(pending.ticket)
    }

    /// Move a pending ticket to lost, remembering the zone the player chose.
    pub fn set_ticket_to_lost(&mut self, id: TicketId, selected_category: Category) -> Option<LostTicket> {
        let pending = self.take_pending(id)?;
        let lost = LostTicket::new(pending.ticket, selected_category);
        self.lost.push(lost.clone());
        record(TicketStatus::Lost);
        Some(lost)
    }

    /// Move a pending ticket to expired.
    pub fn set_ticket_to_expired(&mut self, id: TicketId) -> Option<Ticket> {
        let pending = self.take_pending(id)?;
        self.expired.push(pending.ticket.clone());
        record(TicketStatus::Expired);
        Some(pending.ticket)
    }

    /// Apply the game rule: the right zone processes the ticket, any other
    /// zone loses it.
    ///
    /// Returns `None` when the ticket is not pending.
    pub fn categorize(&mut self, id: TicketId, target: Category) -> Option<Transition> {
        let matches = self.pending_ticket(id)?.ticket.matches(target);
        if matches {
            self.set_ticket_to_processed(id)
                .map(|ticket| Transition::Processed { ticket })
        } else {
            self.set_ticket_to_lost(id, target)
                .map(|ticket| Transition::Lost { ticket })
        }
    }

    /// Advance one ticket's countdown by one second, expiring it at zero.
    pub fn tick(&mut self, id: TicketId) -> CountdownTick {
        let Some(pending) = self.pending.iter_mut().find(|p| p.id() == id) else {
            return CountdownTick::NotPending;
        };

        pending.remaining_secs = pending.remaining_secs.saturating_sub(1);
        if pending.remaining_secs > 0 {
            return CountdownTick::Running {
                remaining_secs: pending.remaining_secs,
            };
        }

        match self.set_ticket_to_expired(id) {
            Some(ticket) => CountdownTick::Expired(ticket),
            None => CountdownTick::NotPending,
        }
    }

    fn take_pending(&mut self, id: TicketId) -> Option<PendingTicket> {
        let idx = self.pending.iter().position(|p| p.id() == id)?;
        Some(self.pending.remove(idx))
    }

    // ------------------------------------------------------------------------
    // Limits
    // ------------------------------------------------------------------------

    /// Set the pending cap. Tickets already pending are kept even if there
    /// are more of them than the new limit.
    pub fn set_tickets_limit(&mut self, limit: usize) {
        self.tickets_limit = limit;
    }

    pub fn tickets_limit(&self) -> usize {
        self.tickets_limit
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn pending(&self) -> &[PendingTicket] {
        &self.pending
    }

    pub fn processed(&self) -> &[Ticket] {
        &self.processed
    }

    pub fn lost(&self) -> &[LostTicket] {
        &self.lost
    }

    pub fn expired(&self) -> &[Ticket] {
        &self.expired
    }

    pub fn pending_ticket(&self, id: TicketId) -> Option<&PendingTicket> {
        self.pending.iter().find(|p| p.id() == id)
    }

    /// Collection currently holding `id`, if any.
    pub fn status_of(&self, id: TicketId) -> Option<TicketStatus> {
        if self.pending.iter().any(|p| p.id() == id) {
            Some(TicketStatus::Pending)
        } else if self.processed.iter().any(|t| t.id == id) {
            Some(TicketStatus::Processed)
        } else if self.lost.iter().any(|t| t.ticket.id == id) {
            Some(TicketStatus::Lost)
        } else if self.expired.iter().any(|t| t.id == id) {
            Some(TicketStatus::Expired)
        } else {
            None
        }
    }

    pub fn counts(&self) -> LifecycleCounts {
        LifecycleCounts {
            pending: self.pending.len(),
            processed: self.processed.len(),
            lost: self.lost.len(),
            expired: self.expired.len(),
        }
    }

    /// Delay the arrival loop should wait before the next `add_ticket`.
    pub fn time_till_next(&self) -> Duration {
        self.time_till_next
    }

    /// Drop every ticket and restart ids from 1. The limit is kept.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.processed.clear();
        self.lost.clear();
        self.expired.clear();
        self.last_id = 0;
        self.time_till_next = self.spawn_delay_min;
    }
}

fn record(status: TicketStatus) {
    TICKET_TRANSITIONS.with_label_values(&[status.as_str()]).inc();
}
