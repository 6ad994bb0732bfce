//! The shared two-mode block walker.
//!
//! Every section body measures and draws markdown blocks through the one
//! `walk` routine, switched by [`LayoutMode`]. That structurally guarantees
//! the core layout contract: the height reported by the measurement pass
//! is the height the render pass consumes, because there is no second
//! implementation to drift.

use crate::canvas::{Color, NoopCanvas, PageCanvas};
use crate::fonts::{is_non_latin, is_rtl, FontKind, TextMeasurer};
use crate::markdown::Block;
use crate::raster::raster_height;
use crate::theme;
use crate::wrap::{wrap, wrap_plain, RunKind};

/// Fraction of the line box from line top to text baseline. Identical in
/// measurement and rendering by construction.
pub const BASELINE_RATIO: f32 = 0.78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Measure,
    Draw,
}

/// Text style for a block body.
#[derive(Debug, Clone, Copy)]
pub struct BlockStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Color,
}

impl BlockStyle {
    pub fn new(size: f32, color: Color) -> Self {
        BlockStyle {
            size,
            bold: false,
            color,
        }
    }

    pub fn bold(size: f32, color: Color) -> Self {
        BlockStyle {
            size,
            bold: true,
            color,
        }
    }

    fn text_font(&self) -> FontKind {
        if self.bold {
            FontKind::SansBold
        } else {
            FontKind::Sans
        }
    }
}

/// Walks block lists in measure or draw mode against one measurer.
pub struct SegmentEngine<'m> {
    pub measurer: &'m mut dyn TextMeasurer,
}

impl<'m> SegmentEngine<'m> {
    pub fn new(measurer: &'m mut dyn TextMeasurer) -> Self {
        SegmentEngine { measurer }
    }

    /// Height the blocks will consume at `max_width`.
    pub fn measure_blocks(&mut self, blocks: &[Block], max_width: f32, style: &BlockStyle) -> f32 {
        self.walk(
            blocks,
            0.0,
            0.0,
            max_width,
            style,
            LayoutMode::Measure,
            &mut NoopCanvas,
        )
    }

    /// Draw the blocks and return the height consumed, which equals the
    /// measurement for the same inputs.
    pub fn render_blocks(
        &mut self,
        blocks: &[Block],
        x: f32,
        top_y: f32,
        max_width: f32,
        style: &BlockStyle,
        canvas: &mut dyn PageCanvas,
    ) -> f32 {
        self.walk(blocks, x, top_y, max_width, style, LayoutMode::Draw, canvas)
    }

    fn walk(
        &mut self,
        blocks: &[Block],
        x: f32,
        top_y: f32,
        max_width: f32,
        style: &BlockStyle,
        mode: LayoutMode,
        canvas: &mut dyn PageCanvas,
    ) -> f32 {
        let mut consumed = 0.0;
        for block in blocks {
            consumed += match block {
                Block::Code(content) => {
                    self.walk_code(content, x, top_y + consumed, max_width, mode, canvas)
                }
                Block::Paragraph(runs) => {
                    self.walk_paragraph(runs, x, top_y + consumed, max_width, style, mode, canvas)
                }
            };
        }
        consumed.max(theme::MIN_BLOCK_HEIGHT)
    }

    fn walk_paragraph(
        &mut self,
        runs: &[crate::markdown::InlineRun],
        x: f32,
        top_y: f32,
        max_width: f32,
        style: &BlockStyle,
        mode: LayoutMode,
        canvas: &mut dyn PageCanvas,
    ) -> f32 {
        let line_height = self.measurer.line_height(style.size);
        let joined: String = runs.iter().map(|r| r.content()).collect();

        // Blank line: keep it visible but compact.
        if joined.trim().is_empty() {
            return line_height * 0.5;
        }

        if is_non_latin(&joined) {
            // Whole paragraph goes through the raster fallback; its height
            // is the bitmap-sizing routine's output in both modes.
            let lines = wrap_plain(
                self.measurer,
                &joined,
                max_width,
                style.size,
                style.text_font(),
            );
            let height = raster_height(lines.len(), style.size);
            if mode == LayoutMode::Draw && !lines.is_empty() {
                canvas.draw_raster_block(
                    &lines,
                    x,
                    top_y,
                    max_width,
                    height,
                    style.size,
                    style.text_font(),
                    style.color,
                    is_rtl(&joined),
                );
            }
            return height;
        }

        let lines = wrap(self.measurer, runs, max_width, style.size, style.bold);
        if lines.is_empty() {
            return line_height * 0.5;
        }

        if mode == LayoutMode::Draw {
            for (i, line) in lines.iter().enumerate() {
                let line_top = top_y + i as f32 * line_height;
                let baseline = line_top + line_height * BASELINE_RATIO;
                let mut cursor = x;
                for run in &line.runs {
                    match run.kind {
                        RunKind::Text => {
                            canvas.draw_text(
                                &run.text,
                                cursor,
                                baseline,
                                style.size,
                                style.text_font(),
                                style.color,
                            );
                        }
                        RunKind::Code => {
                            canvas.fill_rounded_rect(
                                cursor,
                                line_top + 0.5,
                                run.width,
                                line_height - 1.0,
                                theme::PILL_RADIUS,
                                theme::INLINE_CODE_BG,
                            );
                            canvas.draw_text(
                                &run.text,
                                cursor + theme::PILL_PAD_X,
                                baseline,
                                style.size,
                                FontKind::Mono,
                                theme::CODE_TEXT,
                            );
                        }
                    }
                    cursor += run.advance();
                }
            }
        }
        lines.len() as f32 * line_height
    }

    fn walk_code(
        &mut self,
        content: &str,
        x: f32,
        top_y: f32,
        max_width: f32,
        mode: LayoutMode,
        canvas: &mut dyn PageCanvas,
    ) -> f32 {
        let rows = self.code_rows(content, max_width);
        let panel_height =
            theme::CODE_LABEL_ROW + rows.len() as f32 * theme::CODE_LINE_HEIGHT + theme::CODE_BOTTOM_PAD;

        if mode == LayoutMode::Draw {
            canvas.fill_rounded_rect(x, top_y, max_width, panel_height, theme::CODE_RADIUS, theme::CODE_BG);
            canvas.stroke_rounded_rect(
                x,
                top_y,
                max_width,
                panel_height,
                theme::CODE_RADIUS,
                0.8,
                theme::CODE_BORDER,
            );
            canvas.draw_text(
                "CODE",
                x + theme::CODE_GUTTER,
                top_y + 10.0,
                theme::LABEL_FONT - 1.0,
                FontKind::SansBold,
                theme::CODE_TEXT,
            );
            canvas.stroke_line(
                x + 1.0,
                top_y + theme::CODE_LABEL_ROW - 4.0,
                x + max_width - 1.0,
                top_y + theme::CODE_LABEL_ROW - 4.0,
                0.4,
                theme::CODE_BORDER,
            );

            for (i, row) in rows.iter().enumerate() {
                if row.is_empty() {
                    continue;
                }
                let row_top = top_y + theme::CODE_LABEL_ROW + i as f32 * theme::CODE_LINE_HEIGHT;
                if is_non_latin(row) {
                    // Fixed per-line packing: the raster sits in its row
                    // slot instead of baseline-ratio placement.
                    canvas.draw_raster_block(
                        std::slice::from_ref(row),
                        x + theme::CODE_GUTTER,
                        row_top,
                        max_width - 2.0 * theme::CODE_GUTTER,
                        raster_height(1, theme::CODE_FONT),
                        theme::CODE_FONT,
                        FontKind::Mono,
                        theme::CODE_TEXT,
                        is_rtl(row),
                    );
                } else {
                    canvas.draw_text(
                        row,
                        x + theme::CODE_GUTTER,
                        row_top + theme::CODE_LINE_HEIGHT * 0.75,
                        theme::CODE_FONT,
                        FontKind::Mono,
                        theme::CODE_TEXT,
                    );
                }
            }
        }

        panel_height + theme::CODE_GAP_AFTER
    }

    /// Display rows for a code panel: each source line wraps at the panel
    /// width; blank source lines still occupy one row.
    pub fn code_rows(&mut self, content: &str, max_width: f32) -> Vec<String> {
        let inner = max_width - 2.0 * theme::CODE_GUTTER;
        let mut rows = Vec::new();
        for line in content.split('\n') {
            if line.trim().is_empty() {
                rows.push(String::new());
                continue;
            }
            let wrapped = wrap_plain(self.measurer, line, inner, theme::CODE_FONT, FontKind::Mono);
            if wrapped.is_empty() {
                rows.push(line.to_string());
            } else {
                rows.extend(wrapped);
            }
        }
        if rows.is_empty() {
            rows.push(String::new());
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{RecordedOp, RecordingCanvas};
    use crate::fonts::testing::FixedMeasurer;
    use crate::markdown::parse;

    const WIDTH: f32 = 200.0;

    fn style() -> BlockStyle {
        BlockStyle::new(10.0, theme::TEXT_DARK)
    }

    #[test]
    fn measure_equals_render_for_mixed_content() {
        let blocks = parse("intro `code` text\n\n```\nlet x = 1;\n\nlet y = 2;\n```\ntail");
        let mut m = FixedMeasurer;
        let mut eng = SegmentEngine::new(&mut m);
        let measured = eng.measure_blocks(&blocks, WIDTH, &style());

        let mut m2 = FixedMeasurer;
        let mut eng2 = SegmentEngine::new(&mut m2);
        let mut canvas = RecordingCanvas::new();
        let rendered = eng2.render_blocks(&blocks, 0.0, 0.0, WIDTH, &style(), &mut canvas);

        assert!((measured - rendered).abs() < 1e-4);
        assert!(canvas.max_y <= measured + 1e-4);
    }

    #[test]
    fn non_latin_paragraph_renders_as_single_raster() {
        let blocks = parse("ما هو البروتوكول المستخدم؟");
        let mut m = FixedMeasurer;
        let mut eng = SegmentEngine::new(&mut m);
        let mut canvas = RecordingCanvas::new();
        let h = eng.render_blocks(&blocks, 0.0, 0.0, WIDTH, &style(), &mut canvas);

        let rasters: Vec<_> = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::RasterBlock { .. }))
            .collect();
        assert_eq!(rasters.len(), 1);
        if let RecordedOp::RasterBlock { h: raster_h, .. } = rasters[0] {
            assert!((h - raster_h).abs() < 1e-4, "height is the raster sizing output");
        }
    }

    #[test]
    fn code_rows_count_blank_lines() {
        let mut m = FixedMeasurer;
        let mut eng = SegmentEngine::new(&mut m);
        let rows = eng.code_rows("a = 1\n\nb = 2", WIDTH);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "");
    }

    #[test]
    fn code_panel_row_count_matches_rendered_rows() {
        let source = "first\n\nsecond line that is quite long and will wrap somewhere";
        let mut m = FixedMeasurer;
        let mut eng = SegmentEngine::new(&mut m);
        let rows = eng.code_rows(source, WIDTH);

        let blocks = vec![crate::markdown::Block::Code(source.to_string())];
        let mut m2 = FixedMeasurer;
        let mut eng2 = SegmentEngine::new(&mut m2);
        let mut canvas = RecordingCanvas::new();
        eng2.render_blocks(&blocks, 0.0, 0.0, WIDTH, &style(), &mut canvas);

        let drawn_rows = canvas
            .ops
            .iter()
            .filter(|op| match op {
                RecordedOp::Text { text, .. } => text != "CODE",
                RecordedOp::RasterBlock { .. } => true,
                _ => false,
            })
            .count();
        let non_blank = rows.iter().filter(|r| !r.is_empty()).count();
        assert_eq!(drawn_rows, non_blank);

        // Blank rows still advance the cursor: panel height covers all rows.
        let measured = eng.measure_blocks(&blocks, WIDTH, &style());
        let expected = theme::CODE_LABEL_ROW
            + rows.len() as f32 * theme::CODE_LINE_HEIGHT
            + theme::CODE_BOTTOM_PAD
            + theme::CODE_GAP_AFTER;
        assert!((measured - expected).abs() < 1e-4);
    }

    #[test]
    fn empty_paragraph_consumes_half_line() {
        let blocks = parse("a\n\nb");
        let mut m = FixedMeasurer;
        let mut eng = SegmentEngine::new(&mut m);
        let h = eng.measure_blocks(&blocks, WIDTH, &style());
        let lh = 10.0 * crate::fonts::LINE_FACTOR;
        assert!((h - (2.0 * lh + 0.5 * lh)).abs() < 1e-4);
    }
}
