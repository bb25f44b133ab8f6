//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{IngestResult, Orchestrator};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the ask command: ingest one file and answer a question about it.
pub async fn run_ask(file: &str, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Document, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'docent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let ingested = ingest_file(&orchestrator, file).await?;

    let spinner = Output::spinner("Searching the document...");
    match orchestrator.ask(&ingested.document_id, question).await {
        Ok(response) => {
            spinner.finish_and_clear();
            println!("\n{}\n", response.answer);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Read a local file and ingest it under its file name.
pub(super) async fn ingest_file(orchestrator: &Orchestrator, file: &str) -> Result<IngestResult> {
    let path = Settings::expand_path(file);
    let filename = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("Not a file path: {}", file))?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let spinner = Output::spinner(&format!("Indexing {}...", filename));
    let result = orchestrator.ingest(&filename, bytes).await;
    spinner.finish_and_clear();

    let ingested = result?;
    Output::info(&format!(
        "Indexed {} ({} characters, {} chunks)",
        ingested.filename, ingested.text_length, ingested.num_chunks
    ));
    Ok(ingested)
}
