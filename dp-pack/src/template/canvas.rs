//! Surface de dessin abstraite
//!
//! Les coordonnées sont en points, origine en haut à gauche. `y` d'un texte
//! désigne le haut de la ligne.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use super::geometry::{PageRect, Rgb};
use super::metrics::Font;

/// Trait d'un contour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgb,
}

impl Stroke {
    pub fn new(width: f64, color: Rgb) -> Self {
        Self { width, color }
    }
}

/// Style d'un texte
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(font: Font, size: f64, color: Rgb) -> Self {
        Self { font, size, color }
    }
}

/// Opérations élémentaires utilisées par le moteur de mise en page
pub trait Canvas {
    /// Ouvre une nouvelle page
    fn begin_page(&mut self, width: f64, height: f64);

    fn stroke_rect(&mut self, rect: PageRect, stroke: Stroke);

    /// Rectangle plein, avec contour optionnel
    fn fill_rect(&mut self, rect: PageRect, fill: Rgb, stroke: Option<Stroke>);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke);

    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle);

    /// Image étirée dans le rectangle
    fn image(&mut self, path: &Path, rect: PageRect) -> Result<()>;
}

/// Opération enregistrée
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    StrokeRect { rect: PageRect, stroke: Stroke },
    FillRect { rect: PageRect, fill: Rgb, stroke: Option<Stroke> },
    Line { from: (f64, f64), to: (f64, f64), stroke: Stroke },
    Text { text: String, x: f64, y: f64, style: TextStyle },
    Image { path: PathBuf, rect: PageRect },
}

/// Page enregistrée
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordedPage {
    /// Textes de la page, dans l'ordre de dessin
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Rectangles des images de la page
    pub fn images(&self) -> Vec<(&Path, PageRect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { path, rect } => Some((path.as_path(), *rect)),
                _ => None,
            })
            .collect()
    }
}

/// Surface qui mémorise les opérations au lieu de les rendre
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub pages: Vec<RecordedPage>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.pages.push(RecordedPage::default());
        }
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}

impl Canvas for RecordingCanvas {
    fn begin_page(&mut self, width: f64, height: f64) {
        self.pages.push(RecordedPage {
            width,
            height,
            ops: Vec::new(),
        });
    }

    fn stroke_rect(&mut self, rect: PageRect, stroke: Stroke) {
        self.push(DrawOp::StrokeRect { rect, stroke });
    }

    fn fill_rect(&mut self, rect: PageRect, fill: Rgb, stroke: Option<Stroke>) {
        self.push(DrawOp::FillRect { rect, fill, stroke });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Stroke) {
        self.push(DrawOp::Line { from, to, stroke });
    }

    fn text(&mut self, text: &str, x: f64, y: f64, style: TextStyle) {
        self.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
    }

    fn image(&mut self, path: &Path, rect: PageRect) -> Result<()> {
        self.push(DrawOp::Image {
            path: path.to_path_buf(),
            rect,
        });
        Ok(())
    }
}
