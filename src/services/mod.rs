//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and calls to external
//! systems (the LLM provider and fetched web pages).

pub mod extraction;
pub mod faq_generation;
pub mod faq_service;
pub mod key_service;
pub mod llm;
pub mod rate_limit;
pub mod settings_service;
pub mod user_service;
