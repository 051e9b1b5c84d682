//! Document renderers. Each takes a `ResumeRecord` and produces a complete file.

pub mod docx;
pub mod font_metrics;
pub mod handlers;
pub mod latex;
pub mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Word document packaging failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Render output failed: {0}")]
    Io(#[from] std::io::Error),
}
