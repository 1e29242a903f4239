//! Role Aggregate
//!
//! Roles, their modules and the permissions inside each module.

pub mod entity;
pub mod repository;
pub mod api;
pub mod operations;

// Re-export main types
pub use entity::{Module, Role};
pub use repository::RoleRepository;
pub use api::{roles_router, RolesState};
