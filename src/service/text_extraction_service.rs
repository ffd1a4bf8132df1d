use crate::infra::{DocumentFetcher, InfraError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("fetch failed for {url}: {source}")]
    Fetch { url: String, source: InfraError },

    #[error("pdf parsing failed for {url}: {reason}")]
    PdfParsing { url: String, reason: String },

    #[error("extraction worker failed for {url}: {reason}")]
    Worker { url: String, reason: String },
}

/// Text of each page in page order. Pages without a text layer come back empty.
pub fn pdf_pages(bytes: &[u8]) -> Result<Vec<String>, String> {
    pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())
}

pub fn pdf_text(bytes: &[u8]) -> Result<String, String> {
    Ok(pdf_pages(bytes)?.join("\n"))
}

pub async fn extract_text(fetcher: &dyn DocumentFetcher, url: &str) -> Result<String, ExtractionError> {
    let bytes = fetcher
        .fetch(url)
        .await
        .map_err(|source| ExtractionError::Fetch {
            url: url.to_string(),
            source,
        })?;
    debug!(url = %url, size = bytes.len(), "document fetched");

    // pdf parsing is CPU bound and may panic on hostile input
    let text = tokio::task::spawn_blocking(move || pdf_text(&bytes))
        .await
        .map_err(|e| ExtractionError::Worker {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .map_err(|reason| ExtractionError::PdfParsing {
            url: url.to_string(),
            reason,
        })?;
    Ok(text)
}

pub fn policy_section(name: &str, text: &str) -> String {
    format!("Policy: {name}\n{text}")
}

/// Extracts each document in the given order; the first failure aborts the batch.
pub async fn extract_all(
    fetcher: &dyn DocumentFetcher,
    documents: &[SourceDocument],
) -> Result<String, ExtractionError> {
    let mut sections = Vec::with_capacity(documents.len());
    for doc in documents {
        let text = extract_text(fetcher, &doc.url).await?;
        sections.push(policy_section(&doc.name, &text));
    }
    Ok(sections.join("\n\n"))
}
