//! Rendu PDF (printpdf, polices Helvetica standard)

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Pt,
};

use super::canvas::{Canvas, Stroke, TextStyle};
use super::geometry::{PageRect, Rgb};
use super::metrics::{Font, ASCENT};

fn mm(pt: f64) -> Mm {
    Mm::from(Pt(pt as f32))
}

fn color(c: Rgb) -> Color {
    let (r, g, b) = c.unit();
    Color::Rgb(printpdf::Rgb::new(r, g, b, None))
}

/// Document PDF en cours de construction
///
/// Les pages sont ajoutées par `begin_page` ; les coordonnées reçues (origine
/// en haut à gauche) sont retournées vers le repère PDF.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    layer: Option<PdfLayerReference>,
    page_height: f64,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self> {
        let doc = PdfDocument::empty(title);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("Failed to add Helvetica")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("Failed to add Helvetica-Bold")?;

        Ok(Self {
            doc,
            regular,
            bold,
            layer: None,
            page_height: 0.0,
            pages: 0,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Écrit le document sur disque
    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.doc
            .save(&mut writer)
            .with_context(|| format!("Failed to write PDF {}", path.display()))?;
        Ok(())
    }

    fn point(&self, x: f64, y: f64) -> (Point, bool) {
        (Point::new(mm(x), mm(self.page_height - y)), false)
    }

    fn rect_ring(&self, rect: PageRect) -> Vec<(Point, bool)> {
        vec![
            self.point(rect.x, rect.y),
            self.point(rect.right(), rect.y),
            self.point(rect.right(), rect.bottom()),
            self.point(rect.x, rect.bottom()),
        ]
    }

    fn apply_stroke(layer: &PdfLayerReference, stroke: Stroke) {
        layer.set_outline_color(color(stroke.color));
        layer.set_outline_thickness(stroke.width as f32);
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, width: f64, height: f64) {
        let (page, layer) = self
            .doc
            .add_page(mm(width), mm(height), format!("Page {}", self.pages + 1));
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        self.page_height = height;
        self.pages += 1;
    }

    fn stroke_rect(&mut self, rect: PageRect, stroke: Stroke) {
        let Some(layer) = self.layer.clone() else { return };
        Self::apply_stroke(&layer, stroke);
        layer.add_line(Line {
            points: self.rect_ring(rect),
            is_closed: true,
        });
    }

    fn fill_rect(&mut self, rect: PageRect, fill: Rgb, stroke: Option<Stroke>) {
        let Some(layer) = self.layer.clone() else { return };
        layer.set_fill_color(color(fill));
        let mode = match stroke {
            Some(s) => {
                Self::apply_stroke(&layer, s);
                PaintMode::FillStroke
            }
            None => PaintMode::Fill,
        };
        layer.add_polygon(Polygon {
            rings: vec![self.rect_ring(rect)],
            mode,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        let Some(layer) = self.layer.clone() else { return };
        Self::apply_stroke(&layer, stroke);
        layer.add_line(Line {
            points: vec![self.point(from.0, from.1), self.point(to.0, to.1)],
            is_closed: false,
        });
    }

    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        let Some(layer) = self.layer.clone() else { return };
        let font = match style.font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        };
        let baseline = y + style.size * ASCENT;
        layer.set_fill_color(color(style.color));
        layer.use_text(text, style.size as f32, mm(x), mm(self.page_height - baseline), font);
    }

    fn image(&mut self, path: &Path, rect: PageRect) -> Result<()> {
        let layer = self.layer.clone().context("No page opened")?;
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let decoded = printpdf::image_crate::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        // Aplatit l'alpha : les images de page sont opaques
        let rgb = decoded.to_rgb8();
        let (w, h) = (rgb.width().max(1), rgb.height().max(1));
        let flat = printpdf::image_crate::DynamicImage::ImageRgb8(rgb);

        // À 72 dpi, un pixel vaut un point
        Image::from_dynamic_image(&flat).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(mm(rect.x)),
                translate_y: Some(mm(self.page_height - rect.bottom())),
                scale_x: Some((rect.width / f64::from(w)) as f32),
                scale_y: Some((rect.height / f64::from(h)) as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        Ok(())
    }
}
