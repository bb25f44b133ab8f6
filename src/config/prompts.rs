//! Prompt templates for Docent.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub risk: RiskPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// A grounding prompt together with the phrase the model must emit when the
/// context does not answer the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedPrompt {
    /// Template with `{{context}}`, `{{question}}` and `{{not_found}}` placeholders.
    pub template: String,
    /// Sentinel answer for insufficient context.
    pub not_found: String,
}

/// Prompts for retrieval-augmented answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    /// Contract / uploaded document questions.
    pub document: GroundedPrompt,
    /// Video transcript questions.
    pub video: GroundedPrompt,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            document: GroundedPrompt {
                template: r#"You are an expert legal assistant specializing in contract analysis.
Analyze the provided legal agreement context and answer the user's question clearly and accurately.

**Instructions:**
- Answer ONLY based on the provided contract context
- Highlight important clauses, obligations, risks, or rights
- Use plain language to explain legal terms
- If the context is insufficient, say: "{{not_found}}"
- Be precise and cite specific sections when possible

**Contract Context:**
{{context}}

**Question:** {{question}}

**Answer:**"#
                    .to_string(),
                not_found: "I cannot find this information in the uploaded agreement.".to_string(),
            },
            video: GroundedPrompt {
                template: r#"You are a helpful assistant.
Answer ONLY from the provided transcript context.
If the context is insufficient, say: "{{not_found}}"

Context:
{{context}}

Question: {{question}}"#
                    .to_string(),
                not_found: "I don't know from this video.".to_string(),
            },
        }
    }
}

/// Prompts for structured risk assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPrompts {
    /// Instructions placed before the (truncated) document text.
    pub instructions: String,
}

impl Default for RiskPrompts {
    fn default() -> Self {
        Self {
            instructions: r#"You are a senior legal risk assessor. Analyze the provided legal agreement and output a text analysis in STRICT JSON format.

Analyze the contract for:
1. Overall Risk Score (0-100, where 100 is extremely risky/unfair).
2. Identify top 3-5 specific Key Risk Points (clauses that are dangerous, vague, or unfair).
3. A detailed summary of the legal obligations.

Output MUST be valid JSON with this exact structure:
{
    "risk_score": <integer 0-100>,
    "risk_level": "<string: Low, Medium, High, or Critical>",
    "key_risks": [
        {
            "title": "<short title of risk>",
            "description": "<explanation of why it is risky>",
            "severity": "<string: High/Medium/Low>"
        }
    ],
    "detailed_analysis": "<string: A comprehensive summary paragraph>"
}

Contract Text:
"#
            .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let risk_path = custom_path.join("risk.toml");
            if risk_path.exists() {
                let content = std::fs::read_to_string(&risk_path)?;
                prompts.risk = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// The template is scanned once; substituted values are never rescanned,
    /// and `{{name}}` tokens with no matching variable are kept as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            match after.find("}}") {
                Some(close) => {
                    let key = &after[..close];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }
}
