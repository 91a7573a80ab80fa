//! API layer - HTTP endpoints and middleware

pub mod auth;
pub mod health;
pub mod middleware;
pub mod profile;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::{RequireAdmin, RequireUser};
pub use router::create_router_with_state;
pub use state::AppState;
