//! Pre-flight checks before remote operations.
//!
//! Validates that required tools and credentials are available
//! before starting operations that would otherwise fail midway.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{DocentError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Document questions and risk reports need the chat model.
    Document,
    /// Video questions also need yt-dlp.
    Video,
    /// The server needs everything a request may use.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// The API key is always required since answers come from the chat model,
/// whichever embedding provider is configured.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_api_key(settings)?;
    match operation {
        Operation::Document => {}
        Operation::Video => check_tool("yt-dlp")?,
        Operation::Serve => {
            if check_tool("yt-dlp").is_err() {
                tracing::warn!("yt-dlp not found; /video/ask requests will fail");
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    // A custom endpoint may not need a key
    if settings.llm.api_base.is_some() && settings.embedding.provider == EmbeddingProvider::Hashing {
        return Ok(());
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(DocentError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(DocentError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(DocentError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocentError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(DocentError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_endpoint_skips_key_check() {
        let mut settings = Settings::default();
        settings.llm.api_base = Some("http://localhost:11434/v1".to_string());
        settings.embedding.provider = EmbeddingProvider::Hashing;
        assert!(check(Operation::Document, &settings).is_ok());
    }

    #[test]
    fn test_missing_tool_is_reported() {
        assert!(matches!(
            check_tool("docent-no-such-tool"),
            Err(DocentError::ToolNotFound(_))
        ));
    }
}
