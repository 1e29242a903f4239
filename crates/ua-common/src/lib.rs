//! Users API Common
//!
//! Plumbing shared by every binary in the workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
