//! Pipeline orchestrator for Docent.
//!
//! Wires extraction, chunking, indexing, retrieval and generation into the
//! ingest, query, risk, list and delete operations, plus video questions.

use crate::chunking::{Chunk, RecursiveSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::{DocentError, Result};
use crate::extract::{document_id_for, extract_text, DocumentKind};
use crate::llm::{LanguageModel, OpenAIChatModel};
use crate::rag::{AnswerComposer, Retriever};
use crate::risk::{RiskAnalyzer, RiskReport};
use crate::store::{Document, DocumentInfo, DocumentStore};
use crate::transcript::{TranscriptSource, YoutubeTranscripts};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResult {
    pub document_id: String,
    pub filename: String,
    /// Extracted text length in characters.
    pub text_length: usize,
    pub num_chunks: usize,
}

/// Grounded answer about an ingested document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub document_id: String,
    pub filename: String,
}

/// Grounded answer about a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoAnswer {
    pub answer: String,
    pub video_id: String,
}

/// The main orchestrator for the Docent pipeline.
pub struct Orchestrator {
    settings: Settings,
    splitter: RecursiveSplitter,
    retriever: Retriever,
    document_composer: AnswerComposer,
    video_composer: AnswerComposer,
    risk_analyzer: RiskAnalyzer,
    transcripts: Arc<dyn TranscriptSource>,
    store: Arc<DocumentStore>,
}

impl Orchestrator {
    /// Create an orchestrator with the providers named in the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = create_embedder(&settings)?;
        let llm: Arc<dyn LanguageModel> = Arc::new(OpenAIChatModel::from_settings(&settings)?);
        let transcripts: Arc<dyn TranscriptSource> =
            Arc::new(YoutubeTranscripts::from_settings(&settings)?);

        info!(
            "Using {} for answers and {} embeddings",
            settings.llm.model, settings.embedding.provider
        );

        Self::with_components(
            settings,
            prompts,
            embedder,
            llm,
            transcripts,
            Arc::new(DocumentStore::new()),
        )
    }

    /// Create an orchestrator from explicit collaborators.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        transcripts: Arc<dyn TranscriptSource>,
        store: Arc<DocumentStore>,
    ) -> Result<Self> {
        let splitter = RecursiveSplitter::from_settings(&settings.chunking)?;
        let retriever = Retriever::new(embedder);

        let document_composer = AnswerComposer::new(llm.clone(), prompts.rag.document.clone())
            .with_variables(prompts.variables.clone());
        let video_composer = AnswerComposer::new(llm.clone(), prompts.rag.video.clone())
            .with_variables(prompts.variables.clone());
        let risk_analyzer =
            RiskAnalyzer::new(llm, prompts.risk.instructions.clone(), settings.risk.max_chars);

        Ok(Self {
            settings,
            splitter,
            retriever,
            document_composer,
            video_composer,
            risk_analyzer,
            transcripts,
            store,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<DocumentStore> {
        self.store.clone()
    }

    /// Extract, chunk and index an uploaded file, replacing any document with the same id.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn ingest(&self, filename: &str, bytes: Vec<u8>) -> Result<IngestResult> {
        let kind = DocumentKind::from_filename(filename)?;
        let document_id = document_id_for(filename);

        let text = extract_text(bytes, kind).await?;
        let chunks = self.splitter.split(&text, &document_id)?;
        let num_chunks = chunks.len();

        info!("Indexing {} chunks for {}", num_chunks, document_id);
        let index = self.retriever.build_index(chunks).await?;

        let document = Document::new(document_id, filename.to_string(), text, num_chunks);
        let stored = self.store.put(document, index);

        Ok(IngestResult {
            document_id: stored.document.id.clone(),
            filename: stored.document.filename.clone(),
            text_length: stored.document.length,
            num_chunks,
        })
    }

    /// Answer a question from one ingested document.
    #[instrument(skip(self))]
    pub async fn ask(&self, document_id: &str, question: &str) -> Result<QueryAnswer> {
        let stored = self.store.get(document_id)?;

        let results = self
            .retriever
            .retrieve(&stored.index, question, self.settings.retrieval.document_top_k)
            .await?;
        let context: Vec<Chunk> = results.into_iter().map(|r| r.chunk).collect();

        let answer = self.document_composer.compose(&context, question).await?;

        Ok(QueryAnswer {
            answer,
            document_id: stored.document.id.clone(),
            filename: stored.document.filename.clone(),
        })
    }

    /// Structured risk review of one ingested document.
    #[instrument(skip(self))]
    pub async fn assess_risk(&self, document_id: &str) -> Result<RiskReport> {
        let stored = self.store.get(document_id)?;
        self.risk_analyzer.assess(&stored.document.raw_text).await
    }

    pub fn list_documents(&self) -> Vec<DocumentInfo> {
        self.store.list()
    }

    #[instrument(skip(self))]
    pub fn delete_document(&self, document_id: &str) -> Result<()> {
        self.store.delete(document_id)?;
        info!("Deleted document {}", document_id);
        Ok(())
    }

    /// Answer a question from a video's captions.
    ///
    /// The transcript is indexed for this request only and nothing is stored.
    #[instrument(skip(self))]
    pub async fn ask_video(&self, video: &str, question: &str) -> Result<VideoAnswer> {
        if question.trim().is_empty() {
            return Err(DocentError::InvalidInput("Question must not be empty".into()));
        }

        let transcript = self.transcripts.fetch(video).await?;
        let chunks = self
            .splitter
            .split(&transcript.text, &transcript.video_id)
            .map_err(|e| match e {
                DocentError::EmptyInput => DocentError::TranscriptUnavailable(format!(
                    "Transcript for video {} is empty",
                    transcript.video_id
                )),
                other => other,
            })?;

        let index = self.retriever.build_index(chunks).await?;
        let results = self
            .retriever
            .retrieve(&index, question, self.settings.retrieval.video_top_k)
            .await?;
        let context: Vec<Chunk> = results.into_iter().map(|r| r.chunk).collect();

        let answer = self.video_composer.compose(&context, question).await?;

        Ok(VideoAnswer {
            answer,
            video_id: transcript.video_id,
        })
    }
}
