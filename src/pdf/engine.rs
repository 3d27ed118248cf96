//! Drawing surface for the PDF templates.
//!
//! Wraps a `printpdf` document with the handful of primitives the templates
//! need (filled rectangles and aligned text in the builtin Helvetica family)
//! and hands the finished document back as bytes. Nothing touches the
//! filesystem here.

use std::io::{BufWriter, Write};

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb,
};

use super::layout::{PAGE_HEIGHT, PAGE_WIDTH};
use super::RenderError;

const LAYER_NAME: &str = "Contenu";
const PT_TO_MM: f32 = 0.352_778;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            None,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }
}

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    page_count: usize,
}

impl PdfCanvas {
    /// Start an A4 document with one blank page.
    pub fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);

        let fonts = Fonts {
            regular: add_font(&doc, BuiltinFont::Helvetica)?,
            bold: add_font(&doc, BuiltinFont::HelveticaBold)?,
            oblique: add_font(&doc, BuiltinFont::HelveticaOblique)?,
        };
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            fonts,
            page_count: 1,
        })
    }

    pub fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_count += 1;
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Fill a rectangle whose lower-left corner is at (`x`, `y`).
    pub fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: RgbColor) {
        self.layer.set_fill_color(color.to_pdf());
        let rect = Rect::new(Mm(x), Mm(y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    /// Horizontal rule of the given thickness, in millimetres.
    pub fn rule(&self, x1: f32, x2: f32, y: f32, thickness: f32, color: RgbColor) {
        self.fill_rect(x1, y - thickness / 2.0, x2 - x1, thickness, color);
    }

    /// Draw one line of text with its baseline at `y`; `x` is the left edge,
    /// right edge or centre depending on `align`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &self,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        color: RgbColor,
        align: Align,
    ) {
        if text.is_empty() {
            return;
        }
        let width = text_width(text, size, style);
        let x = match align {
            Align::Left => x,
            Align::Right => x - width,
            Align::Center => x - width / 2.0,
        };
        self.layer.set_fill_color(color.to_pdf());
        self.layer
            .use_text(text, size, Mm(x), Mm(y), self.fonts.get(style));
    }

    /// Serialize the document.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let mut bytes = Vec::new();
        {
            let mut writer = BufWriter::new(&mut bytes);
            self.doc
                .save(&mut writer)
                .map_err(|e| RenderError::Pdf(format!("{:?}", e)))?;
            writer.flush().map_err(RenderError::Io)?;
        }
        Ok(bytes)
    }
}

fn add_font(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    doc.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(format!("failed to load builtin font: {:?}", e)))
}

/// Approximate advance width of `text` in millimetres, from the Helvetica
/// metrics (units per 1000 em). Bold glyphs run about 6% wider.
pub fn text_width(text: &str, size: f32, style: FontStyle) -> f32 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    let factor = if style == FontStyle::Bold { 1.06 } else { 1.0 };
    units as f32 / 1000.0 * size * PT_TO_MM * factor
}

fn helvetica_width(c: char) -> u32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '"' => 355,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '^' => 469,
        '+' | '<' | '=' | '>' | '~' => 584,
        '%' => 889,
        '@' => 1015,
        '{' | '}' => 334,
        '|' => 260,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        'W' => 944,
        _ => 556,
    }
}
