//! Error types surfaced at the export boundary.
//!
//! Layout and drawing never fail mid-page: malformed markdown degrades to
//! literal text and per-image failures degrade to "no image". The fatal cases
//! are limited to invalid input, font discovery, and PDF assembly/output.

use thiserror::Error;

/// Fatal export failures, returned once from the export boundary.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The caller supplied an empty question list.
    #[error("no questions to export")]
    NoQuestions,

    /// The answer list length does not match the question list.
    #[error("got {answers} answers for {questions} questions")]
    AnswerMismatch { questions: usize, answers: usize },

    /// No usable font could be located for a required family.
    #[error("font loading failed: {0}")]
    FontLoad(String),

    /// Quiz JSON did not match the expected shape.
    #[error("invalid quiz json: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF object or content-stream assembly failed.
    #[error("pdf backend error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-image failures. Logged and swallowed: a bad image degrades the
/// question to "no image" instead of aborting the export.
#[derive(Debug, Error)]
pub(crate) enum ImageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),
}
