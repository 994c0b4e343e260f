//! Moteur de mise en page du dossier
//!
//! Un vocabulaire fixe de primitives (cadre, titre, pied de page en triptyque,
//! bandeau, tableau clé/valeur, image encadrée) réutilisé par toutes les pages.
//! Aucun état : chaque primitive dessine à une position fixe sur la page
//! courante du `Canvas`.

pub mod canvas;
pub mod geometry;
pub mod metrics;
pub mod pdf;

use std::path::Path;

use anyhow::Result;

pub use canvas::{Canvas, DrawOp, RecordedPage, RecordingCanvas, Stroke, TextStyle};
pub use geometry::{mm_to_pt, pt_to_mm, PageGeometry, PageRect, Rgb};
pub use metrics::{text_width, wrap_text, Font, LINE_HEIGHT};
pub use pdf::PdfCanvas;

/// Hauteur d'une case du pied de page
pub const FOOTER_BOX_HEIGHT: f64 = 20.0;
/// Largeur d'une case du pied de page
pub const FOOTER_BOX_WIDTH: f64 = 140.0;
/// Espace entre deux cases du pied de page
pub const FOOTER_GAP: f64 = 10.0;
/// Hauteur d'un bandeau de libellé
pub const LABEL_BOX_HEIGHT: f64 = 18.0;
/// Hauteur d'une ligne de tableau
pub const TABLE_ROW_HEIGHT: f64 = 20.0;

/// Alignement horizontal d'un bloc de texte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Contenu du pied de page : [émetteur, échelle, identifiant de pièce]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterTriptych {
    pub left: String,
    pub center: String,
    pub right: String,
}

impl FooterTriptych {
    pub fn new(left: impl Into<String>, center: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            center: center.into(),
            right: right.into(),
        }
    }
}

/// Ligne d'un tableau clé/valeur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValueRow {
    pub label: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Primitives de mise en page paramétrées par la géométrie injectée
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub geometry: PageGeometry,
}

impl Template {
    pub fn new(geometry: PageGeometry) -> Self {
        Self { geometry }
    }

    pub fn body(&self, size: f64) -> TextStyle {
        TextStyle::new(Font::Regular, size, self.geometry.text_color)
    }

    pub fn bold(&self, size: f64) -> TextStyle {
        TextStyle::new(Font::Bold, size, self.geometry.text_color)
    }

    fn border(&self, width: f64) -> Stroke {
        Stroke::new(width, self.geometry.border_color)
    }

    /// Ouvre une page aux dimensions de la géométrie
    pub fn begin_page<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.begin_page(self.geometry.width, self.geometry.height);
    }

    /// Cadre du contenu, en retrait de la marge
    pub fn draw_frame<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.stroke_rect(self.geometry.frame_rect(), self.border(0.7));
    }

    /// Titre centré en gras, souligné
    pub fn draw_top_title<C: Canvas + ?Sized>(&self, canvas: &mut C, text: &str) {
        let g = &self.geometry;
        let title_y = g.margin + 10.0;
        let style = TextStyle::new(Font::Bold, 16.0, g.title_color);
        self.draw_text_block(canvas, text, 0.0, title_y, g.width, style, Align::Center);

        let line_y = title_y + 18.0;
        canvas.line(
            (g.margin + 14.0, line_y),
            (g.width - g.margin - 14.0, line_y),
            Stroke::new(1.0, g.title_color),
        );
    }

    /// Rectangles des trois cases du pied de page
    pub fn footer_boxes(&self) -> [PageRect; 3] {
        let g = &self.geometry;
        let total = FOOTER_BOX_WIDTH * 3.0 + FOOTER_GAP * 2.0;
        let start_x = (g.width - total) / 2.0;
        let y = g.height - g.margin - FOOTER_BOX_HEIGHT - 6.0;
        [0.0, 1.0, 2.0].map(|i| {
            PageRect::new(
                start_x + (FOOTER_BOX_WIDTH + FOOTER_GAP) * i,
                y,
                FOOTER_BOX_WIDTH,
                FOOTER_BOX_HEIGHT,
            )
        })
    }

    /// Trois cases encadrées centrées en bas de page
    pub fn draw_footer_triptych<C: Canvas + ?Sized>(&self, canvas: &mut C, content: &FooterTriptych) {
        let style = TextStyle::new(Font::Regular, 8.0, self.geometry.footer_text_color);
        let texts = [&content.left, &content.center, &content.right];

        for (rect, text) in self.footer_boxes().into_iter().zip(texts) {
            canvas.stroke_rect(rect, self.border(0.6));
            self.draw_text_block(canvas, text, rect.x, rect.y + 5.0, rect.width, style, Align::Center);
        }
    }

    /// Bandeau de libellé (fond blanc, bordure)
    pub fn draw_label_box<C: Canvas + ?Sized>(&self, canvas: &mut C, text: &str, x: f64, y: f64, width: f64) {
        let rect = PageRect::new(x, y, width, LABEL_BOX_HEIGHT);
        canvas.fill_rect(rect, Rgb::WHITE, Some(self.border(0.6)));
        self.draw_text_block(canvas, text, x + 6.0, y + 4.0, width - 12.0, self.body(8.5), Align::Left);
    }

    /// Tableau à deux colonnes (libellé 45 %), chaque cellule encadrée
    ///
    /// Retourne la hauteur occupée.
    pub fn draw_key_value_table<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        x: f64,
        y: f64,
        width: f64,
        rows: &[KeyValueRow],
    ) -> f64 {
        let label_width = (width * 0.45).round();
        let value_width = width - label_width;

        for (i, row) in rows.iter().enumerate() {
            let row_y = y + i as f64 * TABLE_ROW_HEIGHT;
            canvas.stroke_rect(PageRect::new(x, row_y, label_width, TABLE_ROW_HEIGHT), self.border(0.6));
            canvas.stroke_rect(
                PageRect::new(x + label_width, row_y, value_width, TABLE_ROW_HEIGHT),
                self.border(0.6),
            );

            self.draw_text_block(canvas, &row.label, x + 6.0, row_y + 5.0, label_width - 12.0, self.bold(9.0), Align::Left);
            self.draw_text_block(
                canvas,
                &row.value,
                x + label_width + 6.0,
                row_y + 5.0,
                value_width - 12.0,
                self.body(9.0),
                Align::Left,
            );
        }

        rows.len() as f64 * TABLE_ROW_HEIGHT
    }

    /// Image encadrée, étirée dans le rectangle
    pub fn draw_image_box<C: Canvas + ?Sized>(&self, canvas: &mut C, path: &Path, rect: PageRect) -> Result<()> {
        canvas.stroke_rect(rect, self.border(0.6));
        canvas.image(path, rect)
    }

    /// Rectangle vide à la place d'une image
    pub fn draw_empty_box<C: Canvas + ?Sized>(&self, canvas: &mut C, rect: PageRect) {
        canvas.stroke_rect(rect, self.border(0.6));
    }

    /// Filet horizontal
    pub fn draw_rule<C: Canvas + ?Sized>(&self, canvas: &mut C, x0: f64, x1: f64, y: f64) {
        canvas.line((x0, y), (x1, y), self.border(0.8));
    }

    /// Texte replié dans une largeur donnée ; retourne la hauteur occupée
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_block<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        style: TextStyle,
        align: Align,
    ) -> f64 {
        let line_height = style.size * LINE_HEIGHT;
        let lines = wrap_text(text, style.font, style.size, width.max(1.0));

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let w = text_width(line, style.font, style.size);
            let line_x = match align {
                Align::Left => x,
                Align::Center => x + (width - w) / 2.0,
                Align::Right => x + width - w,
            };
            canvas.text(line, line_x, y + i as f64 * line_height, style);
        }

        lines.len() as f64 * line_height
    }
}
