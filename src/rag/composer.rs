//! Grounded answer generation.

use crate::chunking::Chunk;
use crate::config::{GroundedPrompt, Prompts};
use crate::error::{DocentError, Result};
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Joins retrieved chunks, in ranked order, into the prompt's context block.
pub fn format_context_for_prompt(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompts the model to answer strictly from supplied context.
pub struct AnswerComposer {
    llm: Arc<dyn LanguageModel>,
    prompt: GroundedPrompt,
    variables: HashMap<String, String>,
}

impl AnswerComposer {
    pub fn new(llm: Arc<dyn LanguageModel>, prompt: GroundedPrompt) -> Self {
        Self {
            llm,
            prompt,
            variables: HashMap::new(),
        }
    }

    /// Extra `{{name}}` values from configuration.
    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// The phrase the model is told to use when the context is insufficient.
    pub fn not_found(&self) -> &str {
        &self.prompt.not_found
    }

    pub fn build_prompt(&self, context: &[Chunk], question: &str) -> String {
        let mut vars = self.variables.clone();
        vars.insert("context".to_string(), format_context_for_prompt(context));
        vars.insert("question".to_string(), question.to_string());
        vars.insert("not_found".to_string(), self.prompt.not_found.clone());
        Prompts::render(&self.prompt.template, &vars)
    }

    /// Answer `question` from `context`, returning the model's text as is.
    #[instrument(skip(self, context), fields(context_chunks = context.len(), model = self.llm.model_name()))]
    pub async fn compose(&self, context: &[Chunk], question: &str) -> Result<String> {
        if context.is_empty() {
            info!("No context retrieved, answering with not-found phrase");
            return Ok(self.prompt.not_found.clone());
        }

        let prompt = self.build_prompt(context, question);

        self.llm.complete(&prompt).await.map_err(|e| {
            warn!("Answer generation failed: {}", e);
            match e {
                DocentError::AnalysisFailed(_) => e,
                other => DocentError::AnalysisFailed(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GroundedStubModel, ScriptedModel};

    fn chunk(i: usize, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_document_id: "lease_txt".to_string(),
            sequence_index: i,
            start: 0,
            end: text.len(),
        }
    }

    fn document_prompt() -> GroundedPrompt {
        Prompts::default().rag.document
    }

    #[test]
    fn test_prompt_embeds_context_question_and_sentinel() {
        let composer = AnswerComposer::new(Arc::new(ScriptedModel::replying("ok")), document_prompt());
        let prompt = composer.build_prompt(
            &[chunk(0, "Rent is $500."), chunk(1, "Deposit is $1000.")],
            "How much is the rent?",
        );

        assert!(prompt.contains("Rent is $500.\n\nDeposit is $1000."));
        assert!(prompt.contains("**Question:** How much is the rent?"));
        assert!(prompt.contains("I cannot find this information in the uploaded agreement."));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_configured_variables_do_not_override_question() {
        let prompt = GroundedPrompt {
            template: "{{question}} ({{jurisdiction}})".to_string(),
            not_found: "n/a".to_string(),
        };
        let variables = HashMap::from([
            ("jurisdiction".to_string(), "Norway".to_string()),
            ("question".to_string(), "ignored".to_string()),
        ]);
        let composer = AnswerComposer::new(Arc::new(ScriptedModel::replying("ok")), prompt)
            .with_variables(variables);

        assert_eq!(composer.build_prompt(&[], "Who pays?"), "Who pays? (Norway)");
    }

    #[test]
    fn test_placeholder_text_in_question_and_context_is_verbatim() {
        let composer = AnswerComposer::new(Arc::new(ScriptedModel::replying("ok")), document_prompt());
        let question = "What does {{not_found}} mean in {{context}}?";
        let chunk_text = "Clause 4 refers to {{question}} and {{not_found}}.";

        let prompt = composer.build_prompt(&[chunk(0, chunk_text)], question);

        assert!(prompt.contains(question));
        assert!(prompt.contains(chunk_text));
        assert_eq!(prompt, composer.build_prompt(&[chunk(0, chunk_text)], question));
    }

    #[tokio::test]
    async fn test_returns_model_text_unmodified() {
        let model = Arc::new(ScriptedModel::replying("  The rent is **$500**.\n"));
        let composer = AnswerComposer::new(model.clone(), document_prompt());

        let answer = composer.compose(&[chunk(0, "Rent is $500.")], "Rent?").await.unwrap();
        assert_eq!(answer, "  The rent is **$500**.\n");
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_context_short_circuits() {
        let model = Arc::new(ScriptedModel::replying("unused"));
        let composer = AnswerComposer::new(model.clone(), document_prompt());

        let answer = composer.compose(&[], "Anything?").await.unwrap();
        assert_eq!(answer, composer.not_found());
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_analysis_failed() {
        let composer =
            AnswerComposer::new(Arc::new(ScriptedModel::failing("quota exceeded")), document_prompt());

        let err = composer.compose(&[chunk(0, "Rent is $500.")], "Rent?").await.unwrap_err();
        assert!(matches!(err, DocentError::AnalysisFailed(ref m) if m.contains("quota exceeded")));
    }

    #[tokio::test]
    async fn test_grounded_model_uses_sentinel_for_unrelated_question() {
        let prompt = document_prompt();
        let model = Arc::new(GroundedStubModel::new(&prompt.not_found));
        let composer = AnswerComposer::new(model, prompt);
        let context = [chunk(0, "The tenant shall pay $500 monthly rent on the first of each month.")];

        let answer = composer.compose(&context, "How much is the rent?").await.unwrap();
        assert!(answer.contains("500"));

        let answer = composer.compose(&context, "What is the termination notice period?").await.unwrap();
        assert_eq!(answer, composer.not_found());
    }
}
