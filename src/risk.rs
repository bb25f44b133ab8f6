//! Structured risk assessment of a whole document.
//!
//! The document text is cut to a fixed character budget, appended to the
//! risk instructions, and the model's reply is parsed as a JSON report.
//! Text past the budget is not analyzed.

use crate::error::{DocentError, Result};
use crate::llm::LanguageModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Overall or per-clause risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

/// One risky clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRisk {
    pub title: String,
    pub description: String,
    pub severity: RiskLevel,
}

/// The report returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// 0 (benign) to 100 (extremely risky).
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub key_risks: Vec<KeyRisk>,
    pub detailed_analysis: String,
}

/// Wire shape of the model's reply, before range checks.
#[derive(Debug, Deserialize)]
struct RawReport {
    risk_score: i64,
    risk_level: RiskLevel,
    key_risks: Vec<KeyRisk>,
    detailed_analysis: String,
}

/// Produces [`RiskReport`]s with a language model.
pub struct RiskAnalyzer {
    llm: Arc<dyn LanguageModel>,
    instructions: String,
    max_chars: usize,
}

impl RiskAnalyzer {
    pub fn new(llm: Arc<dyn LanguageModel>, instructions: String, max_chars: usize) -> Self {
        Self {
            llm,
            instructions,
            max_chars,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// The prompt sent for `raw_text`: instructions followed by the truncated text.
    pub fn build_prompt(&self, raw_text: &str) -> String {
        let (analyzed, _) = truncate_chars(raw_text, self.max_chars);
        format!("{}{}", self.instructions, analyzed)
    }

    #[instrument(skip(self, raw_text), fields(chars = raw_text.chars().count(), model = self.llm.model_name()))]
    pub async fn assess(&self, raw_text: &str) -> Result<RiskReport> {
        if raw_text.trim().is_empty() {
            return Err(DocentError::EmptyInput);
        }

        let (_, truncated) = truncate_chars(raw_text, self.max_chars);
        if truncated {
            info!(
                "Document exceeds {} characters; only the beginning is assessed",
                self.max_chars
            );
        }

        let reply = self.llm.complete(&self.build_prompt(raw_text)).await.map_err(|e| {
            warn!("Risk analysis call failed: {}", e);
            match e {
                DocentError::AnalysisFailed(_) => e,
                other => DocentError::AnalysisFailed(other.to_string()),
            }
        })?;

        parse_report(&reply)
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Remove markdown code-fence markers around a JSON reply.
pub fn strip_code_fences(reply: &str) -> String {
    if reply.contains("```json") {
        reply.replace("```json", "").replace("```", "")
    } else if reply.contains("```") {
        reply.replace("```", "")
    } else {
        reply.to_string()
    }
}

/// Parse and range-check a model reply.
pub fn parse_report(reply: &str) -> Result<RiskReport> {
    let cleaned = strip_code_fences(reply);
    let raw: RawReport = serde_json::from_str(cleaned.trim()).map_err(|e| {
        DocentError::MalformedModelOutput(format!(
            "{}. Response was: {}",
            e,
            reply.chars().take(300).collect::<String>()
        ))
    })?;

    let risk_score = u8::try_from(raw.risk_score)
        .ok()
        .filter(|score| *score <= 100)
        .ok_or_else(|| {
            DocentError::MalformedModelOutput(format!(
                "risk_score {} is outside 0-100",
                raw.risk_score
            ))
        })?;

    debug!(risk_score, key_risks = raw.key_risks.len(), "Parsed risk report");

    Ok(RiskReport {
        risk_score,
        risk_level: raw.risk_level,
        key_risks: raw.key_risks,
        detailed_analysis: raw.detailed_analysis,
    })
}
