//! Greedy inline wrapper.
//!
//! Paragraph runs are tokenized into whitespace, words, and whole
//! inline-code pills, then packed into display lines under a width budget.
//! Pills and words are atomic: a lone token wider than the budget still
//! gets its own line rather than being split or dropped.

use unicode_segmentation::UnicodeSegmentation;

use crate::fonts::{FontKind, TextMeasurer};
use crate::markdown::InlineRun;
use crate::theme::{PILL_GAP, PILL_PAD_X};

/// How a wrapped run is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Text,
    /// Inline-code pill; `width` already includes the pill padding.
    Code,
}

#[derive(Debug, Clone)]
pub struct LineRun {
    pub text: String,
    pub kind: RunKind,
    /// Drawn width. For pills this is the rounded box width.
    pub width: f32,
}

impl LineRun {
    /// Horizontal cursor advance: pills add a fixed inter-token gap so the
    /// following run never touches the pill edge.
    pub fn advance(&self) -> f32 {
        match self.kind {
            RunKind::Text => self.width,
            RunKind::Code => self.width + PILL_GAP,
        }
    }
}

/// One display line: ordered runs plus the accumulated advance width.
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub runs: Vec<LineRun>,
    pub width: f32,
}

enum Token {
    Word(String),
    Space(String),
    Pill(String),
}

fn tokenize(runs: &[InlineRun]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for run in runs {
        match run {
            InlineRun::Text(text) => {
                for piece in text.split_word_bounds() {
                    if piece.chars().all(char::is_whitespace) {
                        tokens.push(Token::Space(piece.to_string()));
                    } else {
                        tokens.push(Token::Word(piece.to_string()));
                    }
                }
            }
            InlineRun::InlineCode(code) => tokens.push(Token::Pill(code.clone())),
        }
    }
    tokens
}

/// Wrap paragraph runs into lines no wider than `max_width`, except for a
/// single token that cannot fit at all. Returns no lines for
/// empty/whitespace-only input; the caller renders that as a compact blank.
pub fn wrap(
    measurer: &mut dyn TextMeasurer,
    runs: &[InlineRun],
    max_width: f32,
    size: f32,
    bold: bool,
) -> Vec<Line> {
    let text_font = if bold { FontKind::SansBold } else { FontKind::Sans };
    let mut lines = Vec::new();
    let mut line = Line::default();
    // Whitespace is held back until a word commits to the same line, which
    // trims trailing whitespace at every flush for free.
    let mut pending_ws: Option<LineRun> = None;

    let mut flush = |line: &mut Line, lines: &mut Vec<Line>| {
        if !line.runs.is_empty() {
            lines.push(std::mem::take(line));
        }
    };

    for token in tokenize(runs) {
        let run = match token {
            Token::Space(s) => {
                if !line.runs.is_empty() {
                    let width = measurer.text_width(&s, size, text_font);
                    pending_ws = Some(LineRun {
                        text: s,
                        kind: RunKind::Text,
                        width,
                    });
                }
                continue;
            }
            Token::Word(w) => {
                let width = measurer.text_width(&w, size, text_font);
                LineRun {
                    text: w,
                    kind: RunKind::Text,
                    width,
                }
            }
            Token::Pill(code) => {
                let width = measurer.text_width(&code, size, FontKind::Mono) + 2.0 * PILL_PAD_X;
                LineRun {
                    text: code,
                    kind: RunKind::Code,
                    width,
                }
            }
        };

        let ws_advance = pending_ws.as_ref().map_or(0.0, LineRun::advance);
        if !line.runs.is_empty() && line.width + ws_advance + run.advance() > max_width {
            pending_ws = None;
            flush(&mut line, &mut lines);
        }
        if let Some(ws) = pending_ws.take() {
            push_run(&mut line, ws);
        }
        push_run(&mut line, run);
    }
    flush(&mut line, &mut lines);
    lines
}

fn push_run(line: &mut Line, run: LineRun) {
    line.width += run.advance();
    match (line.runs.last_mut(), run.kind) {
        // Adjacent text tokens coalesce into one drawn run.
        (Some(last), RunKind::Text) if last.kind == RunKind::Text => {
            last.text.push_str(&run.text);
            last.width += run.width;
        }
        _ => line.runs.push(run),
    }
}

/// Plain-string wrapper used for code-panel rows and raster paragraphs,
/// where there is no run structure to preserve.
pub fn wrap_plain(
    measurer: &mut dyn TextMeasurer,
    text: &str,
    max_width: f32,
    size: f32,
    kind: FontKind,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    for word in text.split_whitespace() {
        let word_width = measurer.text_width(word, size, kind);
        let space_width = if current.is_empty() {
            0.0
        } else {
            measurer.text_width(" ", size, kind)
        };
        if !current.is_empty() && current_width + space_width + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space_width;
        }
        current.push_str(word);
        current_width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::testing::FixedMeasurer;
    use crate::markdown::InlineRun;

    // FixedMeasurer: text chars are size*0.5 wide, mono chars size*0.6.
    const SIZE: f32 = 10.0;

    fn text(s: &str) -> InlineRun {
        InlineRun::Text(s.into())
    }

    fn joined(line: &Line) -> String {
        line.runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn short_paragraph_stays_on_one_line() {
        let mut m = FixedMeasurer;
        let lines = wrap(&mut m, &[text("one two")], 100.0, SIZE, false);
        assert_eq!(lines.len(), 1);
        assert_eq!(joined(&lines[0]), "one two");
        assert_eq!(lines[0].runs.len(), 1, "adjacent text tokens coalesce");
    }

    #[test]
    fn overflow_flushes_and_trims_trailing_whitespace() {
        let mut m = FixedMeasurer;
        // 7 chars fit per 35pt budget; "alpha beta" must split.
        let lines = wrap(&mut m, &[text("alpha beta")], 35.0, SIZE, false);
        assert_eq!(lines.len(), 2);
        assert_eq!(joined(&lines[0]), "alpha");
        assert_eq!(joined(&lines[1]), "beta");
    }

    #[test]
    fn pill_is_never_split() {
        let mut m = FixedMeasurer;
        let runs = [
            text("see "),
            InlineRun::InlineCode("very_long_identifier".into()),
        ];
        let lines = wrap(&mut m, &runs, 60.0, SIZE, false);
        // Pill width: 20 chars * 6 + padding = 126 > 60, so it moves to its
        // own line, whole.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].runs.len(), 1);
        assert_eq!(lines[1].runs[0].kind, RunKind::Code);
        assert_eq!(lines[1].runs[0].text, "very_long_identifier");
    }

    #[test]
    fn oversized_lone_word_still_placed() {
        let mut m = FixedMeasurer;
        let lines = wrap(&mut m, &[text("supercalifragilistic")], 20.0, SIZE, false);
        assert_eq!(lines.len(), 1);
        assert_eq!(joined(&lines[0]), "supercalifragilistic");
    }

    #[test]
    fn whitespace_only_input_yields_no_lines() {
        let mut m = FixedMeasurer;
        assert!(wrap(&mut m, &[text("   ")], 100.0, SIZE, false).is_empty());
        assert!(wrap(&mut m, &[], 100.0, SIZE, false).is_empty());
    }

    #[test]
    fn wrap_plain_packs_words_greedily() {
        let mut m = FixedMeasurer;
        let rows = wrap_plain(&mut m, "aa bb cc dd", 32.0, SIZE, FontKind::Mono);
        // Each word is 12pt, a space 6pt: "aa bb" = 30 <= 32, adding " cc"
        // would reach 48.
        assert_eq!(rows, vec!["aa bb".to_string(), "cc dd".to_string()]);
    }
}
