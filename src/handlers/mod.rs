//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives request data (query string, URL params)
//! 2. Runs a read-only query against the match tables
//! 3. Returns a JSON response
//!
//! Authentication, scopes and rate limits are applied by the gateway
//! middleware before any sport handler runs.

/// Basketball match endpoints
pub mod basketball;
/// Health check endpoint
pub mod health;
/// Query parsing and SQL shared by the sport endpoints
pub mod matches;
/// Soccer match endpoints
pub mod soccer;
