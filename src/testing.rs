//! Deterministic collaborators for unit tests.

use crate::error::{DocentError, Result};
use crate::llm::LanguageModel;
use crate::transcript::{Transcript, TranscriptSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "do", "does", "for", "how", "is", "it", "much", "of", "on", "the",
    "to", "what", "when", "where", "which", "who", "why",
];

/// Answers from the `Context` section of a grounding prompt by keyword match.
///
/// Returns the first context sentence sharing a content word with the
/// question, otherwise the configured not-found phrase.
pub struct GroundedStubModel {
    not_found: String,
    prompts: Mutex<Vec<String>>,
}

impl GroundedStubModel {
    pub fn new(not_found: &str) -> Self {
        Self {
            not_found: not_found.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn section<'a>(prompt: &'a str, start: &str, end: &str) -> &'a str {
        let from = prompt.find(start).map_or(0, |i| i + start.len());
        let rest = &prompt[from..];
        let to = rest.find(end).unwrap_or(rest.len());
        &rest[..to]
    }

    fn keywords(question: &str) -> Vec<String> {
        question
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|w| w.len() > 2 && !STOPWORDS.contains(&w.as_str()))
            .collect()
    }
}

#[async_trait]
impl LanguageModel for GroundedStubModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let context = Self::section(prompt, "Context", "Question");
        let question = Self::section(prompt, "Question:", "\n\n");
        let keywords = Self::keywords(question);

        let answer = context
            .split(['.', '\n'])
            .map(str::trim)
            .find(|sentence| {
                let lower = sentence.to_lowercase();
                keywords.iter().any(|k| lower.contains(k.as_str()))
            })
            .map(|sentence| format!("{}.", sentence))
            .unwrap_or_else(|| self.not_found.clone());

        Ok(answer)
    }

    fn model_name(&self) -> &str {
        "grounded-stub"
    }
}

/// Replays canned completions and records every prompt it receives.
pub struct ScriptedModel {
    replies: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self::new(vec![Ok(reply.to_string())])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(DocentError::OpenAI(message.to_string()))])
    }

    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(DocentError::AnalysisFailed("no scripted reply left".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Serves transcripts from a fixed map keyed by video id.
#[derive(Default)]
pub struct CannedTranscripts {
    transcripts: HashMap<String, String>,
}

impl CannedTranscripts {
    pub fn with(mut self, video_id: &str, text: &str) -> Self {
        self.transcripts.insert(video_id.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl TranscriptSource for CannedTranscripts {
    async fn fetch(&self, video: &str) -> Result<Transcript> {
        self.transcripts
            .get(video)
            .map(|text| Transcript {
                video_id: video.to_string(),
                text: text.clone(),
            })
            .ok_or_else(|| {
                DocentError::TranscriptUnavailable(format!("No captions for video {}", video))
            })
    }
}
