//! Ticket lifecycle: pending tickets age toward expiry and end up processed,
//! lost or expired.

mod store;
mod types;

pub use store::{LifecycleCounts, TicketLifecycle};
pub use types::{CountdownTick, PendingTicket, Transition};
