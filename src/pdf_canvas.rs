//! lopdf drawing backend.
//!
//! One `PdfCanvas` owns the document under construction. Pages are built as
//! content-operation lists and committed by `end_page`; `finish` assembles
//! the page tree, compresses streams, and serializes. Layout hands this
//! backend top-left-origin coordinates; every operator converts to PDF's
//! bottom-left origin at emission.
//!
//! Latin text is drawn with the same TrueType faces the measurer loaded,
//! embedded as WinAnsi-encoded simple fonts with widths taken from the same
//! fontdue metrics, so drawn advances equal measured advances. Raster
//! blocks arrive as coverage bitmaps and are embedded as a 1x1 colored
//! image whose soft mask carries the anti-aliased glyph coverage.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::canvas::{Color, PageCanvas};
use crate::error::ExportError;
use crate::fonts::{FontContext, FontKind};
use crate::images::DecodedImage;
use crate::raster::rasterize_block;
use crate::theme::{PAGE_HEIGHT, PAGE_WIDTH};

const BEZIER_KAPPA: f32 = 0.552_284_75;

pub struct PdfCanvas {
    doc: Document,
    pages_id: ObjectId,
    sans_id: ObjectId,
    sans_bold_id: ObjectId,
    mono_id: ObjectId,
    fonts: FontContext,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    /// XObjects referenced by the current page: (resource name, object id).
    xobjects: Vec<(String, ObjectId)>,
    image_counter: usize,
}

impl PdfCanvas {
    pub fn new(fonts: FontContext) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let sans_id = embed_font(&mut doc, &fonts, FontKind::Sans, "QuizSans");
        let sans_bold_id = embed_font(&mut doc, &fonts, FontKind::SansBold, "QuizSans-Bold");
        let mono_id = embed_font(&mut doc, &fonts, FontKind::Mono, "QuizMono");
        PdfCanvas {
            doc,
            pages_id,
            sans_id,
            sans_bold_id,
            mono_id,
            fonts,
            page_ids: Vec::new(),
            ops: Vec::new(),
            xobjects: Vec::new(),
            image_counter: 0,
        }
    }

    pub fn begin_page(&mut self) {
        self.ops.clear();
        self.xobjects.clear();
    }

    /// Commit the current page's operations as a page object.
    pub fn end_page(&mut self) -> Result<(), ExportError> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));

        let mut resources = dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(self.sans_id),
                "F2" => Object::Reference(self.sans_bold_id),
                "F3" => Object::Reference(self.mono_id),
            },
        };
        if !self.xobjects.is_empty() {
            let mut xobjects = lopdf::Dictionary::new();
            for (name, id) in self.xobjects.drain(..) {
                xobjects.set(name.into_bytes(), Object::Reference(id));
            }
            resources.set("XObject", xobjects);
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Assemble the page tree and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn set_fill(&mut self, color: Color) {
        self.op(
            "rg",
            vec![
                Object::Real(color.r),
                Object::Real(color.g),
                Object::Real(color.b),
            ],
        );
    }

    fn set_stroke(&mut self, color: Color, line_width: f32) {
        self.op(
            "RG",
            vec![
                Object::Real(color.r),
                Object::Real(color.g),
                Object::Real(color.b),
            ],
        );
        self.op("w", vec![Object::Real(line_width)]);
    }

    /// Emit a rounded-rect path in PDF coordinates. `x`/`y` are top-left.
    fn rounded_rect_path(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        let k = BEZIER_KAPPA * r;
        let yb = PAGE_HEIGHT - (y + h);
        let yt = PAGE_HEIGHT - y;
        let xr = x + w;

        self.op("m", vec![Object::Real(x + r), Object::Real(yb)]);
        self.op("l", vec![Object::Real(xr - r), Object::Real(yb)]);
        self.op(
            "c",
            vec![
                Object::Real(xr - r + k),
                Object::Real(yb),
                Object::Real(xr),
                Object::Real(yb + r - k),
                Object::Real(xr),
                Object::Real(yb + r),
            ],
        );
        self.op("l", vec![Object::Real(xr), Object::Real(yt - r)]);
        self.op(
            "c",
            vec![
                Object::Real(xr),
                Object::Real(yt - r + k),
                Object::Real(xr - r + k),
                Object::Real(yt),
                Object::Real(xr - r),
                Object::Real(yt),
            ],
        );
        self.op("l", vec![Object::Real(x + r), Object::Real(yt)]);
        self.op(
            "c",
            vec![
                Object::Real(x + r - k),
                Object::Real(yt),
                Object::Real(x),
                Object::Real(yt - r + k),
                Object::Real(x),
                Object::Real(yt - r),
            ],
        );
        self.op("l", vec![Object::Real(x), Object::Real(yb + r)]);
        self.op(
            "c",
            vec![
                Object::Real(x),
                Object::Real(yb + r - k),
                Object::Real(x + r - k),
                Object::Real(yb),
                Object::Real(x + r),
                Object::Real(yb),
            ],
        );
        self.op("h", vec![]);
    }

    fn font_resource(kind: FontKind) -> &'static str {
        match kind {
            FontKind::Sans => "F1",
            FontKind::SansBold => "F2",
            FontKind::Mono => "F3",
        }
    }

    fn add_image_stream(&mut self, dict: lopdf::Dictionary, data: Vec<u8>) -> ObjectId {
        let mut dict = dict;
        let content = match deflate(&data) {
            Some(compressed) => {
                dict.set("Filter", "FlateDecode");
                compressed
            }
            None => data,
        };
        self.doc.add_object(Stream::new(dict, content))
    }

    fn next_image_name(&mut self) -> String {
        self.image_counter += 1;
        format!("Im{}", self.image_counter)
    }

    /// Place an image XObject into the box at top-left `(x, y)`.
    fn place_xobject(&mut self, name: String, id: ObjectId, x: f32, y: f32, w: f32, h: f32) {
        self.op("q", vec![]);
        self.op(
            "cm",
            vec![
                Object::Real(w),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(h),
                Object::Real(x),
                Object::Real(PAGE_HEIGHT - y - h),
            ],
        );
        self.op("Do", vec![Object::Name(name.clone().into_bytes())]);
        self.op("Q", vec![]);
        self.xobjects.push((name, id));
    }
}

impl PageCanvas for PdfCanvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.op("q", vec![]);
        self.set_fill(color);
        self.op(
            "re",
            vec![
                Object::Real(x),
                Object::Real(PAGE_HEIGHT - y - h),
                Object::Real(w),
                Object::Real(h),
            ],
        );
        self.op("f", vec![]);
        self.op("Q", vec![]);
    }

    fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        self.op("q", vec![]);
        self.set_fill(color);
        self.rounded_rect_path(x, y, w, h, radius);
        self.op("f", vec![]);
        self.op("Q", vec![]);
    }

    fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        line_width: f32,
        color: Color,
    ) {
        self.op("q", vec![]);
        self.set_stroke(color, line_width);
        self.rounded_rect_path(x, y, w, h, radius);
        self.op("S", vec![]);
        self.op("Q", vec![]);
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, line_width: f32, color: Color) {
        self.op("q", vec![]);
        self.set_stroke(color, line_width);
        self.op("m", vec![Object::Real(x1), Object::Real(PAGE_HEIGHT - y1)]);
        self.op("l", vec![Object::Real(x2), Object::Real(PAGE_HEIGHT - y2)]);
        self.op("S", vec![]);
        self.op("Q", vec![]);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let r = radius;
        let k = BEZIER_KAPPA * r;
        let cyp = PAGE_HEIGHT - cy;
        self.op("q", vec![]);
        self.set_fill(color);
        self.op("m", vec![Object::Real(cx + r), Object::Real(cyp)]);
        self.op(
            "c",
            vec![
                Object::Real(cx + r),
                Object::Real(cyp + k),
                Object::Real(cx + k),
                Object::Real(cyp + r),
                Object::Real(cx),
                Object::Real(cyp + r),
            ],
        );
        self.op(
            "c",
            vec![
                Object::Real(cx - k),
                Object::Real(cyp + r),
                Object::Real(cx - r),
                Object::Real(cyp + k),
                Object::Real(cx - r),
                Object::Real(cyp),
            ],
        );
        self.op(
            "c",
            vec![
                Object::Real(cx - r),
                Object::Real(cyp - k),
                Object::Real(cx - k),
                Object::Real(cyp - r),
                Object::Real(cx),
                Object::Real(cyp - r),
            ],
        );
        self.op(
            "c",
            vec![
                Object::Real(cx + k),
                Object::Real(cyp - r),
                Object::Real(cx + r),
                Object::Real(cyp - k),
                Object::Real(cx + r),
                Object::Real(cyp),
            ],
        );
        self.op("f", vec![]);
        self.op("Q", vec![]);
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        baseline_y: f32,
        size: f32,
        font: FontKind,
        color: Color,
    ) {
        self.op("q", vec![]);
        self.set_fill(color);
        self.op("BT", vec![]);
        self.op(
            "Tf",
            vec![Self::font_resource(font).into(), Object::Real(size)],
        );
        self.op(
            "Td",
            vec![Object::Real(x), Object::Real(PAGE_HEIGHT - baseline_y)],
        );
        self.op(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        );
        self.op("ET", vec![]);
        self.op("Q", vec![]);
    }

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
    ) {
        let bitmap = rasterize_block(&self.fonts, lines, w, size, font, rtl);
        let mask_id = self.add_image_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => bitmap.width as i64,
                "Height" => bitmap.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            bitmap.coverage,
        );
        let rgb = [
            (color.r * 255.0).round() as u8,
            (color.g * 255.0).round() as u8,
            (color.b * 255.0).round() as u8,
        ];
        let image_id = self.add_image_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "SMask" => Object::Reference(mask_id),
            },
            rgb.to_vec(),
        );
        let name = self.next_image_name();
        self.place_xobject(name, image_id, x, top_y, w, h);
    }

    fn draw_image(&mut self, image: &DecodedImage, x: f32, top_y: f32, w: f32, h: f32) {
        let image_id = self.add_image_stream(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.rgb.clone(),
        );
        let name = self.next_image_name();
        self.place_xobject(name, image_id, x, top_y, w, h);
    }
}

/// Embed one loaded face as a WinAnsi simple TrueType font. The width
/// table comes from the same fontdue metrics the measurer reports, which
/// keeps drawn text exactly as wide as layout measured it.
fn embed_font(
    doc: &mut Document,
    fonts: &FontContext,
    kind: FontKind,
    base_name: &str,
) -> ObjectId {
    let data = fonts.face_data(kind).to_vec();
    let raw_len = data.len() as i64;
    let face = fonts.font_for(kind);

    // Glyph-space units: 1000 per em.
    let em = 1000.0_f32;
    let widths: Vec<Object> = (0x20..=0xFFu32)
        .map(|cp| {
            // The text encoder writes code points as bytes one-to-one, so
            // the byte value is the character to measure.
            let ch = char::from_u32(cp).unwrap_or(' ');
            Object::Integer(face.metrics(ch, em).advance_width.round() as i64)
        })
        .collect();
    let (ascent, descent) = face
        .horizontal_line_metrics(em)
        .map(|m| (m.ascent, m.descent))
        .unwrap_or((800.0, -200.0));

    let mut file_dict = dictionary! {
        "Length1" => raw_len,
    };
    let file_content = match deflate(&data) {
        Some(compressed) => {
            file_dict.set("Filter", "FlateDecode");
            compressed
        }
        None => data,
    };
    let file_id = doc.add_object(Stream::new(file_dict, file_content));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_name,
        "Flags" => 32,
        "FontBBox" => vec![
            Object::Integer(-1000),
            Object::Real(descent),
            Object::Integer(2000),
            Object::Real(ascent),
        ],
        "ItalicAngle" => 0,
        "Ascent" => Object::Real(ascent),
        "Descent" => Object::Real(descent),
        "CapHeight" => Object::Real(ascent * 0.8),
        "StemV" => 80,
        "FontFile2" => Object::Reference(file_id),
    });

    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => base_name,
        "FirstChar" => 32,
        "LastChar" => 255,
        "Widths" => widths,
        "FontDescriptor" => Object::Reference(descriptor_id),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Encode text for the WinAnsi simple fonts. Callers only route code points
/// at or below U+00FF here; anything else becomes a question mark. Literal
/// string escaping happens in the lopdf writer.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if cp <= 0xFF {
                cp as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn deflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).ok()?;
    encoder.finish().ok()
}
