//! Generative text provider abstraction layer for radar
//!
//! This crate provides provider-agnostic abstractions for asking a
//! generative model for a text completion. It includes:
//!
//! - Message types for model communication
//! - Completion request/response types
//! - Provider trait for model implementations
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
