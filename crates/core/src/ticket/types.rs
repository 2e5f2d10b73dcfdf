//! Core ticket data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a ticket when it is generated.
///
/// Ids come from a per-session counter starting at 1 and are never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TicketId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The true kind of a ticket, and the zones a player can drop it into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bug,
    Feature,
    Technical,
    Support,
}

impl Category {
    /// All categories, in drop-zone order.
    pub const ALL: [Category; 4] = [
        Category::Bug,
        Category::Feature,
        Category::Technical,
        Category::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "bug",
            Category::Feature => "feature",
            Category::Technical => "technical",
            Category::Support => "support",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bug" => Ok(Category::Bug),
            "feature" => Ok(Category::Feature),
            "technical" => Ok(Category::Technical),
            "support" => Ok(Category::Support),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Ticket urgency. Decides how long the player has before the ticket expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Minor,
    Medium,
    Major,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Minor,
        Priority::Medium,
        Priority::Major,
        Priority::Critical,
    ];

    /// Countdown budget in seconds.
    pub fn time_to_process(&self) -> u32 {
        match self {
            Priority::Minor => 50,
            Priority::Medium => 35,
            Priority::Major => 15,
            Priority::Critical => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Minor => "minor",
            Priority::Medium => "medium",
            Priority::Major => "major",
            Priority::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated support ticket. Every field is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// Seconds the player has to categorize the ticket.
    pub time_to_process: u32,
}

impl Ticket {
    /// Build a ticket whose budget follows its priority.
    pub fn new(id: TicketId, description: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            id,
            description: description.into(),
            category,
            priority,
            time_to_process: priority.time_to_process(),
        }
    }

    /// Override the countdown budget.
    #[cfg(test)]
    pub(crate) fn with_time_to_process(mut self, seconds: u32) -> Self {
        self.time_to_process = seconds;
        self
    }

    /// True when `target` is the zone this ticket belongs in.
    pub fn matches(&self, target: Category) -> bool {
        self.category == target
    }
}

/// A ticket the player dropped into the wrong zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    /// Zone the player picked.
    pub selected_category: Category,
}

impl LostTicket {
    pub fn new(ticket: Ticket, selected_category: Category) -> Self {
        Self {
            ticket,
            selected_category,
        }
    }
}

/// Which collection currently holds a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    Processed,
    Lost,
    Expired,
}

impl TicketStatus {
    /// True for the two failure outcomes.
    pub fn is_failure(&self) -> bool {
        matches!(self, TicketStatus::Lost | TicketStatus::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Processed => "processed",
            TicketStatus::Lost => "lost",
            TicketStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_budgets() {
        assert_eq!(Priority::Minor.time_to_process(), 50);
        assert_eq!(Priority::Medium.time_to_process(), 35);
        assert_eq!(Priority::Major.time_to_process(), 15);
        assert_eq!(Priority::Critical.time_to_process(), 10);
    }

    #[test]
    fn test_ticket_new_uses_priority_budget() {
        let ticket = Ticket::new(TicketId(1), "Crash", Category::Bug, Priority::Major);
        assert_eq!(ticket.time_to_process, 15);
        assert!(ticket.matches(Category::Bug));
        assert!(!ticket.matches(Category::Support));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("bug".parse::<Category>().unwrap(), Category::Bug);
        assert_eq!(" Feature ".parse::<Category>().unwrap(), Category::Feature);
        assert_eq!(
            "docs".parse::<Category>().unwrap_err(),
            UnknownCategory("docs".to_string())
        );
    }

    #[test]
    fn test_lost_ticket_serializes_flat() {
        let ticket = Ticket::new(TicketId(3), "Slow menu", Category::Bug, Priority::Critical);
        let lost = LostTicket::new(ticket, Category::Feature);

        let json = serde_json::to_value(&lost).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["category"], "bug");
        assert_eq!(json["selected_category"], "feature");
        assert_eq!(json["time_to_process"], 10);
    }

    #[test]
    fn test_status_flags() {
        assert!(!TicketStatus::Processed.is_failure());
        assert!(TicketStatus::Lost.is_failure());
        assert!(TicketStatus::Expired.is_failure());
        assert_eq!(TicketStatus::Expired.to_string(), "expired");
    }
}
