//! Users API Platform
//!
//! Directory of roles and users:
//! - Roles holding permission modules and child role references
//! - Users with role assignments and an ACTIVE/SUSPENDED status
//! - Merge-on-write updates guarded by version-checked puts
//! - Document store and identity provider seams with in-memory,
//!   MongoDB and Cognito backends
//! - HTTP router plus an API gateway event adapter
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations

// Aggregates
pub mod role;
pub mod user;

// Shared infrastructure
pub mod shared;
pub mod store;
pub mod idp;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

// Application assembly
pub mod app;
pub mod gateway;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};

// Re-export use case infrastructure
pub use usecase::{ExecutionContext, UseCaseError, UseCaseResult, WritePolicy};

// Re-export main entity types for convenience
pub use role::entity::{Module, Role};
pub use user::entity::{User, UserStatus};

// Re-export repositories
pub use role::repository::RoleRepository;
pub use user::repository::UserRepository;

// Re-export seams and backends
pub use idp::{IdentityProvider, IdentityProviderError, MemoryIdentityProvider, SignUpRequest};
#[cfg(feature = "cognito")]
pub use idp::CognitoIdentityProvider;
pub use store::{DocumentStore, MemoryDocumentStore, MongoDocumentStore, PutCondition, StoreError, Tables};

// Re-export assembly
pub use app::{build_router, AppServices, RouterOptions};
pub use gateway::{handle_event, GatewayEvent, GatewayResponse};
pub use seed::DevDataSeeder;
