//! Font loading, metrics, and script classification.
//!
//! Widths come from fontdue glyph metrics of the loaded faces, which the PDF
//! backend embeds, so measured widths match the drawn text exactly. Widths
//! are plain advance sums: the backend positions text with single `Tj`
//! operators, which never kern, so the measurer must not either. Drawing
//! splits per script: Basic Latin goes through the backend's native text
//! operators, everything else through the rasterization fallback in
//! [`crate::raster`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use unicode_script::{Script, UnicodeScript};

use crate::error::ExportError;

/// Line box height as a multiple of font size, shared by measurement and
/// rendering.
pub const LINE_FACTOR: f32 = 1.3;

/// Font face selector for measurement and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKind {
    Sans,
    SansBold,
    Mono,
}

/// Width and line-height oracle behind the wrapper and the block walker.
/// The production impl is [`FontContext`]; tests substitute a fixed-advance
/// measurer so no font files are required.
pub trait TextMeasurer {
    fn text_width(&mut self, text: &str, size: f32, kind: FontKind) -> f32;

    fn line_height(&self, size: f32) -> f32 {
        size * LINE_FACTOR
    }
}

/// Loaded font faces, their raw file bytes (for embedding), and a
/// glyph-metrics cache.
#[derive(Clone)]
pub struct FontContext {
    sans: Font,
    sans_data: Arc<Vec<u8>>,
    sans_bold: Option<(Font, Arc<Vec<u8>>)>,
    mono: Font,
    mono_data: Arc<Vec<u8>>,
    metrics: HashMap<(char, FontKind, u32), fontdue::Metrics>,
}

impl FontContext {
    /// Locate and load the sans, bold, and monospace faces from well-known
    /// system locations. Bold falls back to the regular face when absent;
    /// missing sans or mono is fatal.
    pub fn load() -> Result<Self, ExportError> {
        let (sans, sans_data) = load_first("sans", SANS_CANDIDATES)?;
        let (mono, mono_data) = load_first("monospace", MONO_CANDIDATES)?;
        let sans_bold = load_first("sans-bold", SANS_BOLD_CANDIDATES).ok();
        Ok(FontContext {
            sans,
            sans_data,
            sans_bold,
            mono,
            mono_data,
            metrics: HashMap::new(),
        })
    }

    pub fn font_for(&self, kind: FontKind) -> &Font {
        match kind {
            FontKind::Sans => &self.sans,
            FontKind::SansBold => self.sans_bold.as_ref().map(|(f, _)| f).unwrap_or(&self.sans),
            FontKind::Mono => &self.mono,
        }
    }

    /// Raw font-file bytes of the face behind `kind`, for embedding in the
    /// output document.
    pub fn face_data(&self, kind: FontKind) -> &[u8] {
        match kind {
            FontKind::Sans => &self.sans_data,
            FontKind::SansBold => self
                .sans_bold
                .as_ref()
                .map(|(_, d)| d.as_slice())
                .unwrap_or(&self.sans_data),
            FontKind::Mono => &self.mono_data,
        }
    }

    fn glyph_metrics(&mut self, ch: char, size: f32, kind: FontKind) -> fontdue::Metrics {
        let key = (ch, kind, size.to_bits());
        if let Some(m) = self.metrics.get(&key) {
            return *m;
        }
        let m = self.font_for(kind).metrics(ch, size);
        self.metrics.insert(key, m);
        m
    }
}

impl TextMeasurer for FontContext {
    fn text_width(&mut self, text: &str, size: f32, kind: FontKind) -> f32 {
        text.chars()
            .map(|ch| self.glyph_metrics(ch, size, kind).advance_width)
            .sum()
    }
}

const SANS_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const SANS_BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const MONO_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation2/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

fn load_first(family: &str, candidates: &[&str]) -> Result<(Font, Arc<Vec<u8>>), ExportError> {
    for path in candidates {
        if !Path::new(path).exists() {
            continue;
        }
        let data = std::fs::read(path)?;
        match Font::from_bytes(data.as_slice(), FontSettings::default()) {
            Ok(font) => {
                log::debug!("loaded {family} font from {path}");
                return Ok((font, Arc::new(data)));
            }
            Err(e) => log::warn!("skipping {family} candidate {path}: {e}"),
        }
    }
    Err(ExportError::FontLoad(format!(
        "no usable {family} font found in known system locations"
    )))
}

/// True when the text contains code points the native Latin text path
/// cannot draw; such text is measured and drawn via the raster fallback.
pub fn is_non_latin(text: &str) -> bool {
    text.chars().any(|c| c as u32 > 0xFF)
}

/// True when the text contains a right-to-left script; raster lines are
/// then reordered for display and right-aligned.
pub fn is_rtl(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c.script(), Script::Arabic | Script::Hebrew))
}
