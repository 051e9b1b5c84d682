//! Plain text from an uploaded resume.
//!
//! Soft-failure contract: callers always get text back. Unsupported media types
//! yield an empty string, parser failures yield a human-readable error line, and
//! the result is always capped at `MAX_EXTRACTED_CHARS` characters.

pub mod docx;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

pub const MAX_EXTRACTED_CHARS: usize = 10_000;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    Pdf(#[from] pdf_extract::OutputError),

    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Returns at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Extracts plain text from `bytes` according to its declared media type.
pub fn extract_text(bytes: &[u8], media_type: &str) -> String {
    let media_type = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let result = match media_type.as_str() {
        PDF_MEDIA_TYPE => extract_pdf(bytes),
        DOCX_MEDIA_TYPE => docx::read_body_paragraphs(bytes).map(|p| p.join("\n")),
        other => {
            info!(media_type = other, "Unsupported upload type, no text extracted");
            return String::new();
        }
    };

    match result {
        Ok(text) => truncate_chars(&text, MAX_EXTRACTED_CHARS).to_string(),
        Err(e) => {
            warn!(media_type = %media_type, "Text extraction failed: {e}");
            soft_error(&e.to_string())
        }
    }
}

/// Runs `extract_text` on the blocking pool.
///
/// The PDF parser can panic on malformed input; a panic is reported as text like
/// any other parse failure.
pub async fn extract_text_blocking(bytes: Bytes, media_type: String) -> String {
    tokio::task::spawn_blocking(move || extract_text(&bytes, &media_type))
        .await
        .unwrap_or_else(|e| {
            warn!("Text extraction aborted: {e}");
            soft_error(&e.to_string())
        })
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)?;
    Ok(join_pdf_pages(&pages))
}

/// Joins the text of every page that has any, separated by single spaces.
fn join_pdf_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

fn soft_error(reason: &str) -> String {
    let text = format!("Error parsing file: {reason}");
    truncate_chars(&text, MAX_EXTRACTED_CHARS).to_string()
}
