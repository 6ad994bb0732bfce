//! Abstract drawing surface.
//!
//! Layout code draws through [`PageCanvas`] with a top-left origin and
//! y growing downward; the production backend is
//! [`crate::pdf_canvas::PdfCanvas`]. [`RecordingCanvas`] captures draw
//! extents so the measured-vs-rendered contract can be tested without a
//! PDF backend or installed fonts.

use crate::fonts::FontKind;
use crate::images::DecodedImage;

/// An RGB color in the unit cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

/// One page's drawing surface. Every operation carries its own style;
/// implementations must not keep mutable current-color/font state between
/// calls.
pub trait PageCanvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color);

    fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        line_width: f32,
        color: Color,
    );

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, line_width: f32, color: Color);

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);

    /// Draw Basic-Latin text with its baseline at `baseline_y`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        baseline_y: f32,
        size: f32,
        font: FontKind,
        color: Color,
    );

    /// Draw pre-wrapped lines through the rasterization fallback into the
    /// box at `(x, top_y)` of `w × h` points. `h` must come from
    /// [`crate::raster::raster_height`] for the same line count and size.
    fn draw_raster_block(
        &mut self,
        lines: &[String],
        x: f32,
        top_y: f32,
        w: f32,
        h: f32,
        size: f32,
        font: FontKind,
        color: Color,
        rtl: bool,
    );

    fn draw_image(&mut self, image: &DecodedImage, x: f32, top_y: f32, w: f32, h: f32);
}

/// Canvas that draws nothing. Backs the measurement pass of the shared
/// block walker.
pub(crate) struct NoopCanvas;

impl PageCanvas for NoopCanvas {
    fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: Color) {}
    fn fill_rounded_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Color) {}
    fn stroke_rounded_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: f32, _: Color) {}
    fn stroke_line(&mut self, _: f32, _: f32, _: f32, _: f32, _: f32, _: Color) {}
    fn fill_circle(&mut self, _: f32, _: f32, _: f32, _: Color) {}
    fn draw_text(&mut self, _: &str, _: f32, _: f32, _: f32, _: FontKind, _: Color) {}
    fn draw_raster_block(
        &mut self,
        _: &[String],
        _: f32,
        _: f32,
        _: f32,
        _: f32,
        _: f32,
        _: FontKind,
        _: Color,
        _: bool,
    ) {
    }
    fn draw_image(&mut self, _: &DecodedImage, _: f32, _: f32, _: f32, _: f32) {}
}

/// Summary of one recorded draw call.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Rect { y: f32, h: f32 },
    Text { text: String, baseline_y: f32 },
    RasterBlock { lines: usize, y: f32, h: f32 },
    Image { y: f32, h: f32 },
    Line { y: f32 },
    Circle { cy: f32, r: f32 },
}

/// Recording backend for tests: captures ops and tracks the lowest
/// vertical extent any drawing reached.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingCanvas {
    pub ops: Vec<RecordedOp>,
    pub max_y: f32,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn reach(&mut self, y: f32) {
        if y > self.max_y {
            self.max_y = y;
        }
    }
}

#[cfg(test)]
impl PageCanvas for RecordingCanvas {
    fn fill_rect(&mut self, _x: f32, y: f32, _w: f32, h: f32, _color: Color) {
        self.ops.push(RecordedOp::Rect { y, h });
        self.reach(y + h);
    }

    fn fill_rounded_rect(&mut self, _x: f32, y: f32, _w: f32, h: f32, _r: f32, _color: Color) {
        self.ops.push(RecordedOp::Rect { y, h });
        self.reach(y + h);
    }

    fn stroke_rounded_rect(
        &mut self,
        _x: f32,
        y: f32,
        _w: f32,
        h: f32,
        _r: f32,
        _lw: f32,
        _color: Color,
    ) {
        self.ops.push(RecordedOp::Rect { y, h });
        self.reach(y + h);
    }

    fn stroke_line(&mut self, _x1: f32, y1: f32, _x2: f32, y2: f32, _lw: f32, _color: Color) {
        self.ops.push(RecordedOp::Line { y: y1.max(y2) });
        self.reach(y1.max(y2));
    }

    fn fill_circle(&mut self, _cx: f32, cy: f32, r: f32, _color: Color) {
        self.ops.push(RecordedOp::Circle { cy, r });
        self.reach(cy + r);
    }

    fn draw_text(
        &mut self,
        text: &str,
        _x: f32,
        baseline_y: f32,
        _size: f32,
        _font: FontKind,
        _color: Color,
    ) {
        self.ops.push(RecordedOp::Text {
            text: text.to_string(),
            baseline_y,
        });
        self.reach(baseline_y);
    }

    fn draw_raster_block(
        &mut self,
        lines: &[String],
        _x: f32,
        top_y: f32,
        _w: f32,
        h: f32,
        _size: f32,
        _font: FontKind,
        _color: Color,
        _rtl: bool,
    ) {
        self.ops.push(RecordedOp::RasterBlock {
            lines: lines.len(),
            y: top_y,
            h,
        });
        self.reach(top_y + h);
    }

    fn draw_image(&mut self, _image: &DecodedImage, _x: f32, top_y: f32, _w: f32, h: f32) {
        self.ops.push(RecordedOp::Image { y: top_y, h });
        self.reach(top_y + h);
    }
}
