pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod sessions;
pub mod tickets;
pub mod ws;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
