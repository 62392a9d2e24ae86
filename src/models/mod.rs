//! Data models representing database entities and API payloads.

/// API key credential model
pub mod api_key;
/// Saved FAQ sets and items
pub mod faq;
/// Generation request/response payloads
pub mod generation;
/// Per-user request window of the public API
pub mod rate_window;
/// Generation preferences
pub mod settings;
/// Users mirrored from the session provider
pub mod user;
