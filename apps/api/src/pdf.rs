//! Resume upload handling: extension check and PDF text extraction.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Accepts only filenames ending in `.pdf`, case-insensitively.
pub fn ensure_pdf(file_name: &str) -> Result<(), AppError> {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(AppError::Validation(
            "Invalid file type. Only PDF files are allowed".to_string(),
        ))
    }
}

/// Extracts the text layer of a PDF on the blocking pool.
///
/// The extractor panics on some malformed documents; a panicked task is
/// reported as an unreadable upload.
pub async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    let size = bytes.len();
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::Validation("Could not read the resume PDF".to_string())
        })?;
    let text = extracted
        .map_err(|e| AppError::Validation(format!("Could not read the resume PDF: {e}")))?;

    debug!("Extracted {} chars from a {size}-byte PDF", text.len());
    Ok(text)
}
