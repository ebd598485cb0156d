//! Concrete provider implementations
//!
//! This module contains implementations of the LLMProvider trait for
//! generative text services.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider};
