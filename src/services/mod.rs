//! Business logic services.
//!
//! Services contain logic shared by the HTTP layer and the CLI commands.

pub mod api_key_service;
