//! Language model collaborators.
//!
//! Everything downstream of retrieval talks to a model through the
//! [`LanguageModel`] trait: one prompt in, the raw completion text out.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion providers.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a single prompt and return the model's text unmodified.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
