//! Export pipeline: validate, prefetch, measure, paginate, render.
//!
//! Two modes share the whole pipeline. Blank mode (no answers) produces a
//! printable quiz form; results mode (answers parallel to questions) adds
//! the score block, per-question status, option marking, explanations, and
//! graded essay boxes.

use crate::canvas::PageCanvas;
use crate::error::ExportError;
use crate::fonts::{is_non_latin, is_rtl, FontContext, FontKind, TextMeasurer};
use crate::images::prefetch_images;
use crate::model::{sanitize, Question, QuizConfig, ScoreSummary, UserAnswer};
use crate::pager::{group_sections, PageMetrics};
use crate::pdf_canvas::PdfCanvas;
use crate::raster::raster_height;
use crate::section::SectionBuilder;
use crate::theme;

pub struct QuizExporter {
    fonts: FontContext,
    config: QuizConfig,
}

impl QuizExporter {
    pub fn new(config: QuizConfig) -> Result<Self, ExportError> {
        Ok(QuizExporter {
            fonts: FontContext::load()?,
            config,
        })
    }

    /// Render the quiz to PDF bytes. Pass an empty `answers` slice for the
    /// blank printable form; otherwise it must be exactly parallel to
    /// `questions`. A partial answers array is rejected with
    /// [`ExportError::AnswerMismatch`] rather than padded with skips; the
    /// caller marks skipped questions with [`UserAnswer::Skipped`].
    pub async fn export(
        &self,
        questions: &[Question],
        answers: &[UserAnswer],
    ) -> Result<Vec<u8>, ExportError> {
        let results_mode = validate(questions, answers)?;

        let images = prefetch_images(questions).await;
        let summary = results_mode.then(|| ScoreSummary::compute(questions, answers));

        let mut measurer = self.fonts.clone();
        let mut sections = Vec::new();
        {
            let mut builder = SectionBuilder::new(&mut measurer);
            for (i, question) in questions.iter().enumerate() {
                let answer = if results_mode { answers.get(i) } else { None };
                sections.extend(builder.question_sections(
                    i + 1,
                    question,
                    answer,
                    images[i].as_ref(),
                ));
            }
        }

        let start_y = if results_mode {
            theme::CONTENT_TOP + theme::SCORE_BLOCK_HEIGHT
        } else {
            theme::CONTENT_TOP
        };
        let pages = group_sections(sections, start_y, &PageMetrics::default());
        log::info!(
            "laying out {} question(s) across {} page(s)",
            questions.len(),
            pages.len()
        );

        let mut canvas = PdfCanvas::new(self.fonts.clone());
        let page_count = pages.len();
        for (page_index, group) in pages.into_iter().enumerate() {
            canvas.begin_page();
            draw_header(&mut measurer, &mut canvas, &self.config);

            let mut y = theme::CONTENT_TOP;
            if page_index == 0 {
                if let Some(summary) = &summary {
                    draw_score_block(&mut measurer, &mut canvas, summary);
                    y += theme::SCORE_BLOCK_HEIGHT;
                }
            }
            for section in &group {
                section.render(&mut measurer, &mut canvas, y);
                y += section.height;
            }

            draw_footer(
                &mut measurer,
                &mut canvas,
                &self.config,
                page_index,
                page_count,
            );
            canvas.end_page()?;
        }
        canvas.finish()
    }
}

/// Check the question/answer shape up front; returns whether results mode
/// is active. Answer arrays are all-or-nothing: anything between empty and
/// fully parallel is a caller bug surfaced as an error, never silently
/// padded with skips.
fn validate(questions: &[Question], answers: &[UserAnswer]) -> Result<bool, ExportError> {
    if questions.is_empty() {
        return Err(ExportError::NoQuestions);
    }
    let results_mode = !answers.is_empty();
    if results_mode && answers.len() != questions.len() {
        return Err(ExportError::AnswerMismatch {
            questions: questions.len(),
            answers: answers.len(),
        });
    }
    Ok(results_mode)
}

/// Title band across the top of every page.
pub(crate) fn draw_header(
    measurer: &mut dyn TextMeasurer,
    canvas: &mut dyn PageCanvas,
    config: &QuizConfig,
) {
    canvas.fill_rect(0.0, 0.0, theme::PAGE_WIDTH, theme::HEADER_HEIGHT, theme::PRIMARY);

    let title = sanitize(&config.title);
    if is_non_latin(&title) {
        let size = theme::HEADING_FONT;
        let width = measurer
            .text_width(&title, size, FontKind::SansBold)
            .min(theme::CONTENT_WIDTH)
            .max(1.0);
        canvas.draw_raster_block(
            std::slice::from_ref(&title),
            theme::MARGIN_LEFT,
            9.0,
            width,
            raster_height(1, size),
            size,
            FontKind::SansBold,
            theme::TEXT_WHITE,
            is_rtl(&title),
        );
    } else {
        canvas.draw_text(
            &title,
            theme::MARGIN_LEFT,
            33.0,
            theme::TITLE_FONT,
            FontKind::SansBold,
            theme::TEXT_WHITE,
        );
    }

    let username = sanitize(&config.username);
    if !username.is_empty() && !is_non_latin(&username) {
        let width = measurer.text_width(&username, theme::LABEL_FONT, FontKind::Sans);
        canvas.draw_text(
            &username,
            theme::PAGE_WIDTH - theme::MARGIN_RIGHT - width,
            33.0,
            theme::LABEL_FONT,
            FontKind::Sans,
            theme::TEXT_WHITE,
        );
    } else if !username.is_empty() {
        let size = theme::LABEL_FONT;
        let width = measurer
            .text_width(&username, size, FontKind::Sans)
            .min(theme::CONTENT_WIDTH / 2.0)
            .max(1.0);
        canvas.draw_raster_block(
            std::slice::from_ref(&username),
            theme::PAGE_WIDTH - theme::MARGIN_RIGHT - width,
            22.0,
            width,
            raster_height(1, size),
            size,
            FontKind::Sans,
            theme::TEXT_WHITE,
            is_rtl(&username),
        );
    }
}

/// Footer band: page counter, five progress dots, and the watermark line.
/// The watermark always goes through the raster path so branding strings in
/// any script render.
pub(crate) fn draw_footer(
    measurer: &mut dyn TextMeasurer,
    canvas: &mut dyn PageCanvas,
    config: &QuizConfig,
    page_index: usize,
    page_count: usize,
) {
    let band_top = theme::PAGE_HEIGHT - theme::FOOTER_HEIGHT;
    canvas.fill_rect(0.0, band_top, theme::PAGE_WIDTH, theme::FOOTER_HEIGHT, theme::FOOTER_BG);

    canvas.draw_text(
        &format!("Page {} of {}", page_index + 1, page_count),
        theme::MARGIN_LEFT,
        band_top + 21.0,
        theme::FOOTER_FONT,
        FontKind::Sans,
        theme::TEXT_LIGHT,
    );

    let filled = (((page_index + 1) as f32 / page_count.max(1) as f32)
        * theme::PROGRESS_DOTS as f32)
        .round() as usize;
    let center_x = theme::PAGE_WIDTH / 2.0;
    let first_x = center_x - (theme::PROGRESS_DOTS as f32 - 1.0) / 2.0 * theme::DOT_SPACING;
    let cy = band_top + theme::FOOTER_HEIGHT / 2.0;
    for i in 0..theme::PROGRESS_DOTS {
        let color = if i < filled {
            theme::PRIMARY
        } else {
            theme::PROGRESS_BG
        };
        canvas.fill_circle(first_x + i as f32 * theme::DOT_SPACING, cy, theme::DOT_RADIUS, color);
    }

    let watermark = sanitize(&config.watermark);
    if !watermark.is_empty() {
        let size = theme::FOOTER_FONT;
        let width = measurer
            .text_width(&watermark, size, FontKind::Sans)
            .min(theme::CONTENT_WIDTH / 2.0)
            .max(1.0);
        canvas.draw_raster_block(
            std::slice::from_ref(&watermark),
            theme::PAGE_WIDTH - theme::MARGIN_RIGHT - width,
            band_top + 8.0,
            width,
            raster_height(1, size),
            size,
            FontKind::Sans,
            theme::TEXT_LIGHT,
            is_rtl(&watermark),
        );
    }
}

/// Results summary card at the top of page one.
pub(crate) fn draw_score_block(
    measurer: &mut dyn TextMeasurer,
    canvas: &mut dyn PageCanvas,
    summary: &ScoreSummary,
) {
    let x = theme::MARGIN_LEFT;
    let width = theme::CONTENT_WIDTH;
    let top = theme::CONTENT_TOP;
    let card_h = theme::SCORE_BLOCK_HEIGHT - theme::CARD_MARGIN;

    canvas.fill_rounded_rect(x, top, width, card_h, theme::CARD_RADIUS, theme::ANSWER_BOX_BG);
    canvas.stroke_rounded_rect(x, top, width, card_h, theme::CARD_RADIUS, 1.2, theme::PRIMARY);

    canvas.draw_text(
        "RESULTS",
        x + theme::CARD_PADDING,
        top + 34.0,
        theme::HEADING_FONT,
        FontKind::SansBold,
        theme::TEXT_DARK,
    );

    let accent = if summary.is_passing() {
        theme::SUCCESS
    } else {
        theme::ERROR
    };
    let percent = format!("{}%", summary.percentage);
    let percent_size = 48.0;
    let percent_width = measurer.text_width(&percent, percent_size, FontKind::SansBold);
    canvas.draw_text(
        &percent,
        x + (width - percent_width) / 2.0,
        top + 110.0,
        percent_size,
        FontKind::SansBold,
        accent,
    );

    let verdict = if summary.is_passing() { "PASSED" } else { "FAILED" };
    let badge_w = 110.0;
    let badge_h = theme::SCORE_BADGE_HEIGHT;
    let badge_x = x + (width - badge_w) / 2.0;
    let badge_top = top + 130.0;
    canvas.fill_rounded_rect(badge_x, badge_top, badge_w, badge_h, theme::BUTTON_RADIUS, accent);
    let verdict_width = measurer.text_width(verdict, theme::OPTION_FONT, FontKind::SansBold);
    canvas.draw_text(
        verdict,
        badge_x + (badge_w - verdict_width) / 2.0,
        badge_top + badge_h * 0.65,
        theme::OPTION_FONT,
        FontKind::SansBold,
        theme::TEXT_WHITE,
    );

    let bar_w = width * 0.7;
    let bar_x = x + (width - bar_w) / 2.0;
    let bar_top = top + 160.0;
    canvas.fill_rounded_rect(bar_x, bar_top, bar_w, 8.0, 4.0, theme::PROGRESS_BG);
    let filled_w = bar_w * (summary.percentage.min(100) as f32 / 100.0);
    if filled_w > 0.0 {
        canvas.fill_rounded_rect(bar_x, bar_top, filled_w, 8.0, 4.0, accent);
    }

    let rows: [(&str, usize, crate::canvas::Color); 4] = [
        ("Correct", summary.correct, theme::SUCCESS),
        ("Wrong", summary.wrong, theme::ERROR),
        ("Skipped", summary.skipped, theme::TEXT_LIGHT),
        ("Essays (graded separately)", summary.essays, theme::WARNING),
    ];
    let mut row_y = top + 190.0;
    for (label, count, color) in rows {
        canvas.fill_circle(x + theme::CARD_PADDING + 3.0, row_y - 3.0, 3.0, color);
        canvas.draw_text(
            &format!("{label}: {count}"),
            x + theme::CARD_PADDING + 14.0,
            row_y,
            theme::OPTION_FONT,
            FontKind::Sans,
            theme::TEXT_DARK,
        );
        row_y += 22.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{RecordedOp, RecordingCanvas};
    use crate::fonts::testing::FixedMeasurer;

    fn question() -> Question {
        Question {
            prompt: "p".into(),
            options: vec!["a".into(), "b".into()],
            correct: Some(0),
            explanation: None,
            image: None,
        }
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert!(matches!(validate(&[], &[]), Err(ExportError::NoQuestions)));
    }

    #[test]
    fn partial_answer_array_is_an_error_not_skips() {
        let questions = vec![question(), question()];
        let err = validate(&questions, &[UserAnswer::Choice(0)]);
        assert!(matches!(
            err,
            Err(ExportError::AnswerMismatch {
                questions: 2,
                answers: 1
            })
        ));
    }

    #[test]
    fn empty_answers_mean_blank_mode_and_parallel_mean_results() {
        let questions = vec![question(), question()];
        assert!(matches!(validate(&questions, &[]), Ok(false)));
        let answers = vec![UserAnswer::Choice(0), UserAnswer::Skipped];
        assert!(matches!(validate(&questions, &answers), Ok(true)));
    }

    #[test]
    fn footer_dots_fill_with_progress() {
        let mut m = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        draw_footer(&mut m, &mut canvas, &QuizConfig::default(), 0, 5);
        let dots = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Circle { .. }))
            .count();
        assert_eq!(dots, theme::PROGRESS_DOTS);
    }

    #[test]
    fn footer_watermark_always_uses_raster_path() {
        let mut m = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        draw_footer(&mut m, &mut canvas, &QuizConfig::default(), 0, 1);
        assert!(canvas
            .ops
            .iter()
            .any(|op| matches!(op, RecordedOp::RasterBlock { .. })));
    }

    #[test]
    fn non_latin_title_rasterizes_within_header_band() {
        let mut m = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        let config = QuizConfig {
            title: "اختبار الشبكات".to_string(),
            ..QuizConfig::default()
        };
        draw_header(&mut m, &mut canvas, &config);
        let raster = canvas.ops.iter().find_map(|op| match op {
            RecordedOp::RasterBlock { y, h, .. } => Some((*y, *h)),
            _ => None,
        });
        let (y, h) = raster.expect("non-latin title goes through the raster path");
        assert!(y + h <= theme::HEADER_HEIGHT + 1e-3);
    }

    #[test]
    fn score_block_stays_inside_its_reserved_extent() {
        let summary = ScoreSummary {
            correct: 7,
            wrong: 2,
            skipped: 1,
            essays: 1,
            scorable: 10,
            percentage: 70,
        };
        let mut m = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        draw_score_block(&mut m, &mut canvas, &summary);
        assert!(canvas.max_y <= theme::CONTENT_TOP + theme::SCORE_BLOCK_HEIGHT + 1e-3);
        let has_verdict = canvas.ops.iter().any(|op| match op {
            RecordedOp::Text { text, .. } => text == "PASSED",
            _ => false,
        });
        assert!(has_verdict);
    }
}
