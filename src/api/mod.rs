//! HTTP API over the engine: calculator, recommendations and offer catalog.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::create_router;
