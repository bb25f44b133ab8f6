//! Configuration module for Docent.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{GroundedPrompt, Prompts, RagPrompts, RiskPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, LlmSettings,
    PromptSettings, RetrievalSettings, RiskSettings, ServerSettings, Settings, YoutubeSettings,
};
