//! Tickets: the data model and the random generator that produces them.

mod generator;
mod templates;
mod types;

pub use generator::{fill_template, TicketGenerator};
pub use types::{Category, LostTicket, Priority, Ticket, TicketId, TicketStatus, UnknownCategory};
