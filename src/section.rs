//! Question cards broken into indivisible vertical sections.
//!
//! A section is the unit of pagination: the header strip, the image, the
//! prompt body, each option button, and each results-mode box are separate
//! sections so a long question can split across pages while every drawn box
//! stays whole. `Section::height` is computed by the same walker that later
//! renders the body, so the paginator's arithmetic matches the ink exactly.

use std::sync::Arc;

use crate::canvas::{Color, PageCanvas};
use crate::fonts::{FontKind, TextMeasurer};
use crate::grader::grade;
use crate::images::{fit_box, DecodedImage};
use crate::markdown::{parse, parse_plain, Block, InlineRun};
use crate::model::{sanitize, Question, QuestionStatus, UserAnswer};
use crate::segment::{BlockStyle, SegmentEngine};
use crate::theme;

/// One indivisible vertical slice of a question card.
pub struct Section {
    /// Vertical extent in points, trailing gap included.
    pub height: f32,
    /// True for the header strip that opens a question. The paginator
    /// refuses to start one of these near the page bottom.
    pub starts_question: bool,
    body: SectionBody,
}

enum SectionBody {
    Header {
        number: usize,
        status: Option<QuestionStatus>,
    },
    Image {
        image: Arc<DecodedImage>,
        w: f32,
        h: f32,
    },
    QuestionText {
        blocks: Vec<Block>,
    },
    OptionButton {
        blocks: Vec<Block>,
        correct: bool,
        wrong: bool,
        box_h: f32,
    },
    ScoreBadge {
        score: u8,
    },
    LabeledBox {
        label: &'static str,
        label_color: Color,
        bg: Color,
        border: Option<Color>,
        blocks: Vec<Block>,
        box_h: f32,
        content_offset: f32,
    },
}

impl Section {
    /// Draw this section with its top edge at `top_y`. The ink never
    /// extends below `top_y + self.height`.
    pub fn render(&self, measurer: &mut dyn TextMeasurer, canvas: &mut dyn PageCanvas, top_y: f32) {
        let x = theme::MARGIN_LEFT;
        let width = theme::CONTENT_WIDTH;
        let mut engine = SegmentEngine::new(measurer);

        match &self.body {
            SectionBody::Header { number, status } => {
                canvas.fill_rounded_rect(
                    x,
                    top_y,
                    width,
                    theme::HEADER_STRIP_HEIGHT,
                    theme::BUTTON_RADIUS,
                    theme::PRIMARY,
                );
                let baseline = top_y + theme::HEADER_STRIP_HEIGHT * 0.68;
                canvas.draw_text(
                    &format!("QUESTION {number}"),
                    x + theme::TEXT_INSET,
                    baseline,
                    theme::QUESTION_FONT,
                    FontKind::SansBold,
                    theme::TEXT_WHITE,
                );
                if let Some(status) = status {
                    let label = status.label();
                    let label_width =
                        engine
                            .measurer
                            .text_width(label, theme::LABEL_FONT, FontKind::SansBold);
                    canvas.draw_text(
                        label,
                        x + width - theme::TEXT_INSET - label_width,
                        baseline,
                        theme::LABEL_FONT,
                        FontKind::SansBold,
                        theme::TEXT_WHITE,
                    );
                }
            }
            SectionBody::Image { image, w, h } => {
                canvas.draw_image(image, x + (width - w) / 2.0, top_y, *w, *h);
            }
            SectionBody::QuestionText { blocks } => {
                engine.render_blocks(blocks, x, top_y, width, &question_style(), canvas);
            }
            SectionBody::OptionButton {
                blocks,
                correct,
                wrong,
                box_h,
            } => {
                let inner_width = width - 2.0 * theme::BUTTON_PADDING;
                let text_color = if *correct || *wrong {
                    canvas.fill_rounded_rect(
                        x,
                        top_y,
                        width,
                        *box_h,
                        theme::BUTTON_RADIUS,
                        if *correct {
                            theme::BUTTON_CORRECT
                        } else {
                            theme::BUTTON_WRONG
                        },
                    );
                    theme::TEXT_WHITE
                } else {
                    canvas.stroke_rounded_rect(
                        x,
                        top_y,
                        width,
                        *box_h,
                        theme::BUTTON_RADIUS,
                        1.0,
                        theme::BUTTON_NEUTRAL,
                    );
                    theme::TEXT_DARK
                };
                let style = BlockStyle::new(theme::OPTION_FONT, text_color);
                let content_h = engine.measure_blocks(blocks, inner_width, &style);
                let offset = (box_h - content_h) / 2.0;
                engine.render_blocks(
                    blocks,
                    x + theme::BUTTON_PADDING,
                    top_y + offset,
                    inner_width,
                    &style,
                    canvas,
                );
            }
            SectionBody::ScoreBadge { score } => {
                let color = match score {
                    4..=5 => theme::SUCCESS,
                    2..=3 => theme::WARNING,
                    _ => theme::ERROR,
                };
                let badge_width = 120.0;
                canvas.fill_rounded_rect(
                    x,
                    top_y,
                    badge_width,
                    theme::SCORE_BADGE_HEIGHT,
                    theme::BUTTON_RADIUS,
                    color,
                );
                canvas.draw_text(
                    &format!("SCORE: {score}/5"),
                    x + theme::TEXT_INSET,
                    top_y + theme::SCORE_BADGE_HEIGHT * 0.65,
                    theme::OPTION_FONT,
                    FontKind::SansBold,
                    theme::TEXT_WHITE,
                );
            }
            SectionBody::LabeledBox {
                label,
                label_color,
                bg,
                border,
                blocks,
                box_h,
                content_offset,
            } => {
                canvas.fill_rounded_rect(x, top_y, width, *box_h, theme::BUTTON_RADIUS, *bg);
                if let Some(border) = border {
                    canvas.stroke_rounded_rect(
                        x,
                        top_y,
                        width,
                        *box_h,
                        theme::BUTTON_RADIUS,
                        0.8,
                        *border,
                    );
                }
                canvas.draw_text(
                    label,
                    x + theme::TEXT_INSET,
                    top_y + theme::ANSWER_LABEL_OFFSET,
                    theme::LABEL_FONT,
                    FontKind::SansBold,
                    *label_color,
                );
                engine.render_blocks(
                    blocks,
                    x + theme::TEXT_INSET,
                    top_y + content_offset,
                    width - 2.0 * theme::TEXT_INSET,
                    &BlockStyle::new(theme::OPTION_FONT, theme::TEXT_DARK),
                    canvas,
                );
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn test_section(height: f32, starts_question: bool) -> Section {
        Section {
            height,
            starts_question,
            body: SectionBody::QuestionText { blocks: Vec::new() },
        }
    }
}

fn question_style() -> BlockStyle {
    BlockStyle::new(theme::QUESTION_FONT, theme::TEXT_DARK)
}

/// Builds the section list for each question, in display order.
pub struct SectionBuilder<'m> {
    engine: SegmentEngine<'m>,
}

impl<'m> SectionBuilder<'m> {
    pub fn new(measurer: &'m mut dyn TextMeasurer) -> Self {
        SectionBuilder {
            engine: SegmentEngine::new(measurer),
        }
    }

    /// Sections for one question. `answer` is present in results mode;
    /// `None` produces the blank printable form. The card's bottom margin
    /// is folded into the final section's height.
    pub fn question_sections(
        &mut self,
        number: usize,
        question: &Question,
        answer: Option<&UserAnswer>,
        image: Option<&Arc<DecodedImage>>,
    ) -> Vec<Section> {
        let mut sections = Vec::new();

        let status = answer.map(|a| QuestionStatus::of(question, a));
        sections.push(Section {
            height: theme::HEADER_SECTION_HEIGHT,
            starts_question: true,
            body: SectionBody::Header { number, status },
        });

        if let Some(image) = image {
            let (nw, nh) = image.natural_size();
            let (w, h) = fit_box(nw, nh, theme::CONTENT_WIDTH, theme::IMAGE_MAX_HEIGHT);
            if h > 0.0 {
                sections.push(Section {
                    height: h + theme::IMAGE_GAP,
                    starts_question: false,
                    body: SectionBody::Image {
                        image: Arc::clone(image),
                        w,
                        h,
                    },
                });
            }
        }

        let prompt_blocks = parse(&sanitize(&question.prompt));
        let prompt_h =
            self.engine
                .measure_blocks(&prompt_blocks, theme::CONTENT_WIDTH, &question_style());
        sections.push(Section {
            height: prompt_h + theme::QUESTION_TEXT_GAP,
            starts_question: false,
            body: SectionBody::QuestionText {
                blocks: prompt_blocks,
            },
        });

        if question.is_essay() {
            self.push_essay_sections(&mut sections, question, answer);
        } else {
            self.push_option_sections(&mut sections, question, answer);
        }

        if let Some(explanation) = question.explanation.as_deref() {
            if !explanation.trim().is_empty() {
                sections.push(self.labeled_box(
                    "EXPLANATION",
                    theme::WARNING,
                    theme::EXPLANATION_BG,
                    Some(theme::WARNING),
                    parse(&sanitize(explanation)),
                    theme::EXPLANATION_PAD,
                    theme::EXPLANATION_MIN,
                    theme::EXPLANATION_CONTENT_OFFSET,
                ));
            }
        }

        if let Some(last) = sections.last_mut() {
            last.height += theme::CARD_MARGIN;
        }
        sections
    }

    fn push_option_sections(
        &mut self,
        sections: &mut Vec<Section>,
        question: &Question,
        answer: Option<&UserAnswer>,
    ) {
        let chosen = match answer {
            Some(UserAnswer::Choice(i)) => Some(*i),
            _ => None,
        };
        let count = question.options.len();
        for (i, option) in question.options.iter().enumerate() {
            // Correct-option marking is mode-independent: the blank form is
            // an answer sheet too. Only the wrong marker needs a choice.
            let correct = Some(i) == question.correct;
            let wrong = chosen == Some(i) && !correct;
            let marker = if correct {
                "> "
            } else if wrong {
                "X "
            } else {
                ""
            };
            let letter = (b'A' + (i % 26) as u8) as char;
            let prefix = format!("{marker}{letter}. ");

            let mut blocks = parse(&sanitize(option));
            prepend_text(&mut blocks, &prefix);

            let inner_width = theme::CONTENT_WIDTH - 2.0 * theme::BUTTON_PADDING;
            let style = BlockStyle::new(theme::OPTION_FONT, theme::TEXT_DARK);
            let content_h = self.engine.measure_blocks(&blocks, inner_width, &style);
            let box_h = (content_h + 2.0 * theme::BUTTON_PADDING).max(theme::BUTTON_MIN_HEIGHT);
            let gap = if i + 1 == count {
                theme::OPTIONS_TRAILING_GAP
            } else {
                theme::OPTION_GAP
            };
            sections.push(Section {
                height: box_h + gap,
                starts_question: false,
                body: SectionBody::OptionButton {
                    blocks,
                    correct,
                    wrong,
                    box_h,
                },
            });
        }
    }

    fn push_essay_sections(
        &mut self,
        sections: &mut Vec<Section>,
        question: &Question,
        answer: Option<&UserAnswer>,
    ) {
        let model = question.model_answer().unwrap_or_default();

        if let Some(answer) = answer {
            let user_text = match answer {
                UserAnswer::Text(t) if !t.trim().is_empty() => sanitize(t),
                _ => String::new(),
            };
            // No badge for a skipped essay: a grade implies an attempt.
            if !user_text.is_empty() {
                let score = grade(&user_text, model);
                sections.push(Section {
                    height: theme::SCORE_BADGE_HEIGHT + theme::SCORE_BADGE_GAP,
                    starts_question: false,
                    body: SectionBody::ScoreBadge { score },
                });
            }

            // The user's own words render raw: no inline-code pass.
            let user_blocks = if user_text.is_empty() {
                parse_plain("(no answer)")
            } else {
                parse_plain(&user_text)
            };
            sections.push(self.labeled_box(
                "YOUR ANSWER",
                theme::TEXT_LIGHT,
                theme::ANSWER_BOX_BG,
                None,
                user_blocks,
                theme::ANSWER_BOX_PAD,
                theme::ANSWER_BOX_MIN,
                theme::ANSWER_CONTENT_OFFSET,
            ));
        } else {
            // Blank form: a tall empty box to write in.
            sections.push(self.labeled_box(
                "YOUR ANSWER",
                theme::TEXT_LIGHT,
                theme::ANSWER_BOX_BG,
                Some(theme::BUTTON_NEUTRAL),
                Vec::new(),
                theme::ANSWER_BOX_PAD,
                theme::ANSWER_BOX_MIN * 2.0,
                theme::ANSWER_CONTENT_OFFSET,
            ));
        }

        // The model answer is shown in both modes.
        sections.push(self.labeled_box(
            "MODEL ANSWER",
            theme::SUCCESS,
            theme::FORMAL_BOX_BG,
            Some(theme::SUCCESS),
            parse(&sanitize(model)),
            theme::ANSWER_BOX_PAD,
            theme::ANSWER_BOX_MIN,
            theme::ANSWER_CONTENT_OFFSET,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn labeled_box(
        &mut self,
        label: &'static str,
        label_color: Color,
        bg: Color,
        border: Option<Color>,
        blocks: Vec<Block>,
        pad: f32,
        min: f32,
        content_offset: f32,
    ) -> Section {
        let inner_width = theme::CONTENT_WIDTH - 2.0 * theme::TEXT_INSET;
        let style = BlockStyle::new(theme::OPTION_FONT, theme::TEXT_DARK);
        let content_h = if blocks.is_empty() {
            0.0
        } else {
            self.engine.measure_blocks(&blocks, inner_width, &style)
        };
        let box_h = (content_h + pad).max(min);
        Section {
            height: box_h + theme::ANSWER_BOX_GAP,
            starts_question: false,
            body: SectionBody::LabeledBox {
                label,
                label_color,
                bg,
                border,
                blocks,
                box_h,
                content_offset,
            },
        }
    }
}

/// Insert plain text ahead of the first paragraph content, creating a
/// leading paragraph when the body opens with a code fence.
fn prepend_text(blocks: &mut Vec<Block>, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    match blocks.first_mut() {
        Some(Block::Paragraph(runs)) => match runs.first_mut() {
            Some(InlineRun::Text(text)) => text.insert_str(0, prefix),
            _ => runs.insert(0, InlineRun::Text(prefix.to_string())),
        },
        _ => blocks.insert(
            0,
            Block::Paragraph(vec![InlineRun::Text(prefix.to_string())]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::fonts::testing::FixedMeasurer;

    fn mc_question() -> Question {
        Question {
            prompt: "Which layer does TCP live on?".into(),
            options: vec!["Transport".into(), "Network".into(), "Link".into()],
            correct: Some(0),
            explanation: Some("TCP is a transport protocol.".into()),
            image: None,
        }
    }

    fn essay_question() -> Question {
        Question {
            prompt: "Explain osmosis.".into(),
            options: vec!["Diffusion of water through a membrane".into()],
            correct: None,
            explanation: None,
            image: None,
        }
    }

    fn build(
        q: &Question,
        answer: Option<&UserAnswer>,
    ) -> Vec<Section> {
        let mut m = FixedMeasurer;
        let mut builder = SectionBuilder::new(&mut m);
        builder.question_sections(1, q, answer, None)
    }

    #[test]
    fn only_the_header_starts_a_question() {
        let sections = build(&mc_question(), None);
        assert!(sections[0].starts_question);
        assert!(sections[1..].iter().all(|s| !s.starts_question));
    }

    fn drawn_text(sections: &[Section]) -> Vec<String> {
        let mut texts = Vec::new();
        for section in sections {
            let mut m = FixedMeasurer;
            let mut canvas = RecordingCanvas::new();
            section.render(&mut m, &mut canvas, 0.0);
            for op in canvas.ops {
                if let crate::canvas::RecordedOp::Text { text, .. } = op {
                    texts.push(text);
                }
            }
        }
        texts
    }

    #[test]
    fn explanation_box_renders_in_both_modes() {
        let q = mc_question();
        let blank = build(&q, None);
        let results = build(&q, Some(&UserAnswer::Choice(1)));
        // header + prompt + 3 options + explanation, in both modes.
        assert_eq!(blank.len(), 6);
        assert_eq!(results.len(), 6);
        assert!(drawn_text(&blank).iter().any(|t| t == "EXPLANATION"));
    }

    #[test]
    fn correct_option_marked_in_blank_mode() {
        let sections = build(&mc_question(), None);
        let texts = drawn_text(&sections);
        assert!(texts.iter().any(|t| t.starts_with("> A. ")));
        assert!(texts.iter().all(|t| !t.starts_with("X ")));
    }

    #[test]
    fn essay_results_mode_adds_badge_and_both_boxes() {
        let q = essay_question();
        let answer = UserAnswer::Text("water diffusion through membrane".into());
        let sections = build(&q, Some(&answer));
        // header + prompt + badge + your-answer + model-answer.
        assert_eq!(sections.len(), 5);
    }

    #[test]
    fn blank_mode_essay_still_shows_model_answer() {
        let sections = build(&essay_question(), None);
        let texts = drawn_text(&sections);
        assert!(texts.iter().any(|t| t == "MODEL ANSWER"));
        assert!(texts.iter().any(|t| t.contains("Diffusion of water")));
    }

    #[test]
    fn skipped_essay_gets_no_score_badge() {
        let sections = build(&essay_question(), Some(&UserAnswer::Skipped));
        // header + prompt + your-answer + model-answer; no badge section.
        assert_eq!(sections.len(), 4);
        let texts = drawn_text(&sections);
        assert!(texts.iter().all(|t| !t.starts_with("SCORE:")));
        assert!(texts.iter().any(|t| t.contains("(no answer)")));
    }

    #[test]
    fn every_section_renders_within_its_height() {
        let q = mc_question();
        let answer = UserAnswer::Choice(0);
        let sections = build(&q, Some(&answer));
        for section in &sections {
            let mut m = FixedMeasurer;
            let mut canvas = RecordingCanvas::new();
            section.render(&mut m, &mut canvas, 0.0);
            assert!(
                canvas.max_y <= section.height + 1e-3,
                "ink {} exceeds section height {}",
                canvas.max_y,
                section.height
            );
        }
    }

    #[test]
    fn card_margin_folds_into_last_section() {
        let q = mc_question();
        let mut m = FixedMeasurer;
        let mut builder = SectionBuilder::new(&mut m);
        let with_margin = builder.question_sections(1, &q, None, None);

        // Last section's ink stops CARD_MARGIN short of its height.
        let last = with_margin.last().unwrap();
        let mut m2 = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        last.render(&mut m2, &mut canvas, 0.0);
        assert!(last.height - canvas.max_y >= theme::CARD_MARGIN - 1e-3);
    }

    #[test]
    fn option_prefix_survives_code_fence_body() {
        let q = Question {
            prompt: "p".into(),
            options: vec!["```\nlet x = 1;\n```".into(), "plain".into()],
            correct: Some(1),
            explanation: None,
            image: None,
        };
        let sections = build(&q, None);
        let mut m = FixedMeasurer;
        let mut canvas = RecordingCanvas::new();
        // Section 2 is the first option.
        sections[2].render(&mut m, &mut canvas, 0.0);
        let has_prefix = canvas.ops.iter().any(|op| match op {
            crate::canvas::RecordedOp::Text { text, .. } => text.starts_with("A."),
            _ => false,
        });
        assert!(has_prefix);
    }
}
