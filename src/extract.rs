//! Text extraction for uploaded files.

use crate::error::{DocentError, Result};
use lopdf::Document as PdfDocument;
use std::path::Path;
use tracing::{debug, warn};

/// Upload formats accepted for ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Detect the kind from a filename's extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        if ext.eq_ignore_ascii_case("pdf") {
            Ok(DocumentKind::Pdf)
        } else if ext.eq_ignore_ascii_case("txt") {
            Ok(DocumentKind::Text)
        } else {
            Err(DocumentKind::unsupported())
        }
    }

    fn unsupported() -> DocentError {
        DocentError::InvalidInput("Only PDF and TXT files are supported".to_string())
    }
}

/// Stable document id for a filename: dots and spaces become underscores.
pub fn document_id_for(filename: &str) -> String {
    filename.replace(['.', ' '], "_")
}

/// Extract plain text from uploaded bytes.
pub async fn extract_text(bytes: Vec<u8>, kind: DocumentKind) -> Result<String> {
    match kind {
        DocumentKind::Text => String::from_utf8(bytes).map_err(|e| {
            DocentError::ExtractionFailed(format!("Text file is not valid UTF-8: {}", e))
        }),
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| DocentError::ExtractionFailed(format!("Task join error: {}", e)))?,
    }
}

/// Text of each page in page order, one newline after every page that has text.
fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| {
        DocentError::ExtractionFailed(format!("Failed to extract text from PDF: {}", e))
    })?;

    let mut text = String::new();
    for page_num in doc.get_pages().keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                // lopdf already ends each text object with a newline
                text.push_str(page_text.trim_end_matches('\n'));
                text.push('\n');
            }
            Ok(_) => debug!(page = page_num, "Page has no text"),
            Err(e) => warn!(page = page_num, "Skipping unreadable page: {}", e),
        }
    }

    if text.trim().is_empty() {
        return Err(DocentError::ExtractionFailed(
            "No text could be extracted from the PDF".to_string(),
        ));
    }

    Ok(text)
}
