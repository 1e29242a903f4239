//! Use Case Infrastructure
//!
//! - `UseCaseError` - categorized error types for consistent handling
//! - `ExecutionContext` - tracing ids carried through an execution
//! - `read_modify_write` - version-checked merge cycle with bounded retry

pub mod error;
pub mod execution_context;
pub mod optimistic;

pub use error::{format_names, UseCaseError};
pub use execution_context::ExecutionContext;
pub use optimistic::{read_modify_write, Versioned, VersionedRepository, WriteOutcome, WritePolicy};

/// Result type for use case execution.
pub type UseCaseResult<T> = Result<T, UseCaseError>;
