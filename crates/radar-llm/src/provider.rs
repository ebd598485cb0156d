//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for generative text providers
///
/// Implementations of this trait provide access to different model services
/// (e.g., Google Gemini). Providers are constructed once and shared; they
/// hold no mutable state beyond the HTTP connection pool.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the model
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the model's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g., "gemini")
    fn name(&self) -> &str;
}
