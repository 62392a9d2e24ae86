//! HTTP middleware components.
//!
//! Both middlewares authenticate and short-circuit unauthorized requests;
//! they differ in the credential they accept.

/// API key gateway for the public API
pub mod api_key;
/// Session token authentication for the web UI endpoints
pub mod auth;
