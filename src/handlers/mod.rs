//! HTTP request handlers (route handlers).

/// Saved FAQ sets
pub mod faqs;
/// Extraction, generation and SEO scoring for the web UI
pub mod generation;
/// Service health
pub mod health;
/// API key issuance
pub mod keys;
/// API-key gated public generation
pub mod public;
/// Generation preferences
pub mod settings;
/// User sync
pub mod users;
