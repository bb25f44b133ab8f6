//! OpenAI client configuration with sensible defaults.

use crate::error::{DocentError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Client type shared by the embedding and chat implementations.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client whose requests fail after `timeout`.
///
/// `api_base` points the client at any OpenAI-compatible endpoint; the API
/// key is read from `OPENAI_API_KEY`.
pub fn create_client(api_base: Option<&str>, timeout: Duration) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map a client error into the crate error type.
pub(crate) fn api_error(context: &str, err: async_openai::error::OpenAIError) -> DocentError {
    DocentError::OpenAI(format!("{}: {}", context, err))
}
