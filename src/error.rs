//! Error types for Docent.

use thiserror::Error;

/// Library-level error type for Docent operations.
#[derive(Error, Debug)]
pub enum DocentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document appears to be empty")]
    EmptyInput,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcript not available: {0}")]
    TranscriptUnavailable(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DocentError {
    /// Stable, machine-readable code reported to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            DocentError::InvalidInput(_) | DocentError::EmptyInput => "invalid_input",
            DocentError::NotFound(_) => "not_found",
            DocentError::ExtractionFailed(_) => "extraction_failed",
            DocentError::TranscriptUnavailable(_) => "transcript_unavailable",
            DocentError::AnalysisFailed(_) | DocentError::Embedding(_) | DocentError::OpenAI(_) => {
                "analysis_failed"
            }
            DocentError::MalformedModelOutput(_) => "malformed_model_output",
            DocentError::Config(_)
            | DocentError::ToolNotFound(_)
            | DocentError::Io(_)
            | DocentError::Json(_)
            | DocentError::TomlParse(_)
            | DocentError::Http(_) => "internal_error",
        }
    }
}

/// Result type alias for Docent operations.
pub type Result<T> = std::result::Result<T, DocentError>;
