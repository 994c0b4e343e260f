//! Géométrie fixe de la page (points PDF, origine en haut à gauche)

use serde::Serialize;

/// Points par pouce
pub const PT_PER_INCH: f64 = 72.0;
/// Millimètres par pouce
pub const MM_PER_INCH: f64 = 25.4;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_INCH * PT_PER_INCH
}

pub fn pt_to_mm(pt: f64) -> f64 {
    pt / PT_PER_INCH * MM_PER_INCH
}

/// Couleur RVB 8 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);

    /// Depuis un entier `0xRRGGBB`
    pub const fn hex(v: u32) -> Self {
        Self(((v >> 16) & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, (v & 0xFF) as u8)
    }

    /// Depuis une chaîne `#RRGGBB`
    pub fn parse(s: &str) -> Option<Self> {
        let h = s.strip_prefix('#').unwrap_or(s);
        if h.len() != 6 {
            return None;
        }
        u32::from_str_radix(h, 16).ok().map(Self::hex)
    }

    /// Composantes normalisées `[0, 1]`
    pub fn unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

/// Rectangle en points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PageRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Géométrie et couleurs d'une page, injectées dans le moteur de mise en page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageGeometry {
    /// Largeur (A4 paysage : 841.89 pt)
    pub width: f64,
    /// Hauteur (A4 paysage : 595.28 pt)
    pub height: f64,
    /// Marge du cadre
    pub margin: f64,
    pub title_color: Rgb,
    pub text_color: Rgb,
    pub border_color: Rgb,
    pub footer_text_color: Rgb,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: 18.0,
            title_color: Rgb::hex(0x1E3A8A),
            text_color: Rgb::hex(0x111827),
            border_color: Rgb::hex(0xD1D5DB),
            footer_text_color: Rgb::hex(0x6B7280),
        }
    }
}

impl PageGeometry {
    pub fn content_left(&self) -> f64 {
        self.margin + 20.0
    }

    pub fn content_right(&self) -> f64 {
        self.width - self.margin - 20.0
    }

    pub fn content_top(&self) -> f64 {
        self.margin + 70.0
    }

    pub fn content_bottom(&self) -> f64 {
        self.height - self.margin - 40.0
    }

    pub fn content_width(&self) -> f64 {
        self.content_right() - self.content_left()
    }

    /// Rectangle du cadre
    pub fn frame_rect(&self) -> PageRect {
        PageRect::new(
            self.margin,
            self.margin,
            self.width - self.margin * 2.0,
            self.height - self.margin * 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-12);
        assert!((pt_to_mm(mm_to_pt(132.5)) - 132.5).abs() < 1e-12);
    }

    #[test]
    fn test_content_area() {
        let g = PageGeometry::default();
        assert_eq!(g.content_left(), 38.0);
        assert_eq!(g.content_top(), 88.0);
        assert!((g.content_width() - 765.89).abs() < 1e-9);
        assert!((g.content_bottom() - 537.28).abs() < 1e-9);
    }

    #[test]
    fn test_rgb() {
        assert_eq!(Rgb::parse("#1E3A8A"), Some(Rgb(0x1E, 0x3A, 0x8A)));
        assert_eq!(Rgb::parse("nope"), None);
        assert_eq!(Rgb::hex(0xD1D5DB), Rgb(0xD1, 0xD5, 0xDB));
    }
}
