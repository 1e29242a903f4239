//! Shared infrastructure: error mapping, request/response helpers, health.

pub mod api_common;
pub mod error;
pub mod health_api;
