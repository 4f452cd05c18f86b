//! Completion service seam.
//!
//! Every agent handler and the intent classifier make exactly one call through
//! [`CompletionService::complete`]. There is no streaming and no token budget.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiSettings};

use crate::error::AssistantResult;
use std::future::Future;

/// A text-in, text-out language model.
pub trait CompletionService: Send + Sync {
    /// Submit `prompt` and return the model's answer text.
    fn complete(&self, prompt: &str) -> impl Future<Output = AssistantResult<String>> + Send;
}
