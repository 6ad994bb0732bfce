//! quizpress: quiz-to-PDF export with automatic essay grading.
//!
//! Takes a quiz (questions in the app's JSON shape, optionally the user's
//! answers) and produces a paginated A4 PDF: question cards with markdown
//! prompts, option buttons, images, and in results mode a score summary,
//! answer marking, explanations, and graded essay answers.
//!
//! Layout is two-pass: every card is measured into fixed-height sections,
//! sections are packed onto pages, then rendered. Measurement and rendering
//! share one code path, so heights always match the ink.
//!
//! ```no_run
//! # async fn demo() -> Result<(), quizpress::ExportError> {
//! use quizpress::{export_quiz, QuizConfig};
//!
//! let questions = quizpress::questions_from_json(
//!     r#"[{"q": "2 + 2?", "options": ["3", "4"], "correct": 1}]"#,
//! )?;
//! let pdf = export_quiz(&questions, &[], &QuizConfig::default()).await?;
//! std::fs::write("quiz.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```

mod canvas;
mod error;
mod export;
mod fonts;
mod grader;
mod images;
mod markdown;
mod model;
mod pager;
mod pdf_canvas;
mod raster;
mod section;
mod segment;
mod theme;
mod wrap;

pub use canvas::{Color, PageCanvas};
pub use error::ExportError;
pub use export::QuizExporter;
pub use fonts::{FontContext, FontKind, TextMeasurer};
pub use grader::grade;
pub use images::{fit_box, prefetch_images, DecodedImage};
pub use model::{
    questions_from_json, sanitize, Question, QuestionStatus, QuizConfig, ScoreSummary, UserAnswer,
};
pub use pager::{group_sections, PageMetrics};
pub use section::{Section, SectionBuilder};

use std::path::Path;

/// Render a quiz to PDF bytes. An empty `answers` slice produces the blank
/// printable form; a slice parallel to `questions` produces the results
/// document.
pub async fn export_quiz(
    questions: &[Question],
    answers: &[UserAnswer],
    config: &QuizConfig,
) -> Result<Vec<u8>, ExportError> {
    QuizExporter::new(config.clone())?
        .export(questions, answers)
        .await
}

/// Like [`export_quiz`], writing the document to `path`.
pub async fn export_quiz_to_path(
    questions: &[Question],
    answers: &[UserAnswer],
    config: &QuizConfig,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let bytes = export_quiz(questions, answers, config).await?;
    std::fs::write(path, bytes)?;
    Ok(())
}
