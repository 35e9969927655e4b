//! Web server module
//!
//! Provides the JSON HTTP API over the knowledge base.

mod handlers;
mod routes;
mod state;

pub use handlers::ApiError;
pub use routes::create_router;
pub use state::AppState;
