//! Docent - grounded answers over documents and videos
//!
//! A service and CLI that ingests contracts (PDF or plain text), answers
//! questions strictly from their content, produces structured risk reports,
//! and answers questions about YouTube videos from their captions.
//!
//! # Overview
//!
//! Docent allows you to:
//! - Upload a document and ask questions grounded in its text
//! - Get a scored risk review of a contract
//! - Ask questions about a video using its caption transcript
//! - Serve all of the above over an HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `extract` - Text extraction from uploads
//! - `chunking` - Recursive text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory cosine index
//! - `store` - Registry of ingested documents
//! - `rag` - Retrieval and grounded answer composition
//! - `risk` - Structured risk assessment
//! - `transcript` - Video caption transcripts
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use docent::config::Settings;
//! use docent::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let bytes = std::fs::read("lease.txt")?;
//!     let ingested = orchestrator.ingest("lease.txt", bytes).await?;
//!     let answer = orchestrator.ask(&ingested.document_id, "How much is the rent?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod risk;
pub mod store;
pub mod transcript;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DocentError, Result};
