//! User Aggregate
//!
//! Directory users, their role assignments and account status.

pub mod entity;
pub mod repository;
pub mod api;
pub mod operations;

// Re-export main types
pub use entity::{User, UserStatus};
pub use repository::UserRepository;
pub use api::{users_router, UsersState};
