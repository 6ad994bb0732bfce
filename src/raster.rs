//! Rasterization fallback for text the native PDF text path cannot draw.
//!
//! The backend draws pre-positioned glyph runs and cannot shape complex or
//! right-to-left scripts, so non-Latin paragraphs are rendered once into an
//! offscreen coverage bitmap at a fixed supersampling factor and embedded
//! as an image. The bitmap-sizing arithmetic lives in one routine used by
//! both the measurement and render passes; heights are never derived from
//! a separate line-count approximation.

use unicode_bidi::BidiInfo;

use crate::fonts::{FontContext, FontKind};

/// Offscreen pixels per point.
pub const SUPERSAMPLE: f32 = 3.0;
/// Raster line box as a multiple of the supersampled em.
pub const RASTER_LINE_FACTOR: f32 = 1.55;
/// Descender slack under the last line, in ems.
const BOTTOM_SLACK: f32 = 0.5;
/// Baseline sits this far above the line-box bottom, in ems.
const BASELINE_LIFT: f32 = 0.15;

/// Height in points consumed by `line_count` raster lines at `size`. The
/// ceiling happens in pixel space, exactly as the bitmap will be sized.
pub fn raster_height(line_count: usize, size: f32) -> f32 {
    raster_height_px(line_count, size) as f32 / SUPERSAMPLE
}

fn raster_height_px(line_count: usize, size: f32) -> usize {
    if line_count == 0 {
        return 0;
    }
    let px = size * SUPERSAMPLE;
    (line_count as f32 * px * RASTER_LINE_FACTOR + px * BOTTOM_SLACK).ceil() as usize
}

/// Grayscale coverage bitmap, rows top to bottom.
pub struct RasterBitmap {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// Rasterize pre-wrapped lines into a single coverage bitmap of
/// `width_pt × raster_height(lines.len(), size)` points. RTL lines are
/// reordered for display and right-aligned.
pub fn rasterize_block(
    fonts: &FontContext,
    lines: &[String],
    width_pt: f32,
    size: f32,
    kind: FontKind,
    rtl: bool,
) -> RasterBitmap {
    let px = size * SUPERSAMPLE;
    let width = (width_pt * SUPERSAMPLE).ceil().max(1.0) as usize;
    let height = raster_height_px(lines.len(), size).max(1);
    let mut coverage = vec![0u8; width * height];
    let font = fonts.font_for(kind);

    for (i, line) in lines.iter().enumerate() {
        let display: String = if rtl { display_order(line) } else { line.clone() };
        let baseline = ((i + 1) as f32 * px * RASTER_LINE_FACTOR - px * BASELINE_LIFT) as i32;

        let mut pen = if rtl {
            let line_width: f32 = display
                .chars()
                .map(|c| font.metrics(c, px).advance_width)
                .sum();
            (width as f32 - 1.0 - line_width).max(0.0)
        } else {
            1.0
        };

        for ch in display.chars() {
            let (metrics, bitmap) = font.rasterize(ch, px);
            let x0 = pen as i32 + metrics.xmin;
            let y0 = baseline - metrics.ymin - metrics.height as i32;
            blend(&mut coverage, width, height, &bitmap, metrics.width, x0, y0);
            pen += metrics.advance_width;
        }
    }

    RasterBitmap {
        width,
        height,
        coverage,
    }
}

/// Reorder one logical line into visual order.
fn display_order(line: &str) -> String {
    let bidi = BidiInfo::new(line, None);
    match bidi.paragraphs.first() {
        Some(para) => bidi.reorder_line(para, para.range.clone()).into_owned(),
        None => line.to_string(),
    }
}

fn blend(
    dst: &mut [u8],
    dst_w: usize,
    dst_h: usize,
    src: &[u8],
    src_w: usize,
    x0: i32,
    y0: i32,
) {
    if src_w == 0 {
        return;
    }
    let src_h = src.len() / src_w;
    for row in 0..src_h {
        let y = y0 + row as i32;
        if y < 0 || y as usize >= dst_h {
            continue;
        }
        for col in 0..src_w {
            let x = x0 + col as i32;
            if x < 0 || x as usize >= dst_w {
                continue;
            }
            let d = &mut dst[y as usize * dst_w + x as usize];
            *d = (*d).max(src[row * src_w + col]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_is_shared_and_monotonic() {
        assert_eq!(raster_height(0, 10.0), 0.0);
        let one = raster_height(1, 10.0);
        let two = raster_height(2, 10.0);
        assert!(one > 10.0, "one line covers at least an em");
        assert!(two > one);
        // Pixel-space ceiling: the point height times the supersample
        // factor is a whole pixel count.
        let px = one * SUPERSAMPLE;
        assert!((px - px.round()).abs() < 1e-4);
    }
}
