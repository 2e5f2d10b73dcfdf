//! Types produced by the lifecycle store.

use serde::{Deserialize, Serialize};

use crate::ticket::{LostTicket, Ticket, TicketId, TicketStatus};

/// A ticket waiting to be categorized, with its countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Seconds left before the ticket expires.
    pub remaining_secs: u32,
}

impl PendingTicket {
    /// Start a full countdown for `ticket`.
    pub fn new(ticket: Ticket) -> Self {
        let remaining_secs = ticket.time_to_process;
        Self {
            ticket,
            remaining_secs,
        }
    }

    pub fn id(&self) -> TicketId {
        self.ticket.id
    }
}

/// A ticket leaving pending for one of the terminal collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    Processed { ticket: Ticket },
    Lost { ticket: LostTicket },
    Expired { ticket: Ticket },
}

impl Transition {
    /// Status the ticket ended in.
    pub fn status(&self) -> TicketStatus {
        match self {
            Transition::Processed { .. } => TicketStatus::Processed,
            Transition::Lost { .. } => TicketStatus::Lost,
            Transition::Expired { .. } => TicketStatus::Expired,
        }
    }

    /// The ticket as generated (for lost tickets, without the selected zone).
    pub fn ticket(&self) -> &Ticket {
        match self {
            Transition::Processed { ticket } | Transition::Expired { ticket } => ticket,
            Transition::Lost { ticket } => &ticket.ticket,
        }
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket().id
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Transition::Processed { .. })
    }
}

/// Result of advancing one ticket's countdown by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownTick {
    /// The ticket is still pending with this many seconds left.
    Running { remaining_secs: u32 },
    /// The countdown reached zero and the ticket moved to expired.
    Expired(Ticket),
    /// The ticket is no longer pending; nothing happened.
    NotPending,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{Category, Priority};

    fn ticket() -> Ticket {
        Ticket::new(TicketId(4), "Menu freezes", Category::Bug, Priority::Medium)
    }

    #[test]
    fn test_pending_ticket_starts_with_full_budget() {
        let pending = PendingTicket::new(ticket());
        assert_eq!(pending.remaining_secs, 35);
        assert_eq!(pending.id(), TicketId(4));
    }

    #[test]
    fn test_transition_accessors() {
        let lost = Transition::Lost {
            ticket: LostTicket::new(ticket(), Category::Support),
        };
        assert_eq!(lost.status(), TicketStatus::Lost);
        assert_eq!(lost.ticket().category, Category::Bug);
        assert_eq!(lost.ticket_id(), TicketId(4));
        assert!(!lost.is_success());

        let processed = Transition::Processed { ticket: ticket() };
        assert!(processed.is_success());
        assert_eq!(processed.status(), TicketStatus::Processed);
    }

    #[test]
    fn test_transition_serialization_tag() {
        let expired = Transition::Expired { ticket: ticket() };
        let json = serde_json::to_value(&expired).unwrap();
        assert_eq!(json["outcome"], "expired");
        assert_eq!(json["ticket"]["id"], 4);
    }
}
