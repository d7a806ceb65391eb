mod auth;
mod client;
mod sidebar_state;

pub use auth::AuthTokens;
pub use client::{ApiClient, ApiError};
pub use sidebar_state::SidebarState;
