//! HTTP middleware components.
//!
//! The tenant gateway runs in front of every sport route: it authenticates
//! the API key, enforces sport scopes and per-key rate limits, and records
//! key usage in the background.

/// API key authentication middleware
pub mod auth;
/// Background `last_used_at` updates
pub mod last_used;
/// Per-key token buckets
pub mod rate_limit;
