//! Shared infrastructure for the restaurant reservation Lambda.
//!
//! This crate provides the pieces every handler relies on:
//!
//! - [`ApiRequest`] / [`ApiResponse`]: transport-neutral request and response envelope
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`Config`]: environment configuration read once at cold start
//! - [`init_tracing`]: JSON or text tracing for CloudWatch Logs
//! - Query and body types with validation for each endpoint
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides seeded in-memory fixtures and request
//! builders for handler testing. Enable the `test-utils` feature to access it
//! from dependent crates.

mod config;
mod gateway;
mod problem;
mod requests;
mod response;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{Config, ConfigError};
pub use gateway::{resolve_request_id, ApiRequest};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_CONFLICT, PROBLEM_FORBIDDEN, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_NOT_FOUND, PROBLEM_UNAUTHORIZED,
};
pub use requests::{parse_json_body, AvailableTablesParams, FeedbackParams, Validate};
pub use response::ApiResponse;
pub use tracing_init::{init_tracing, LogFormat};
