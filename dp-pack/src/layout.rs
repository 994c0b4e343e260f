//! Disposition des pièces du dossier : zones d'image et cadres de carte

use dpgeo::MapFrame;

use crate::template::{pt_to_mm, PageGeometry, PageRect};

/// Espace entre plan et orthophoto (DP1 1/1000)
pub const DP1_GAP: f64 = 16.0;
pub const DP1_MAP_HEIGHT: f64 = 420.0;
/// Hauteur des cartes DP1 seules ; 560 pt déborderait sur le pied de page
pub const DP1_SINGLE_HEIGHT: f64 = 420.0;
pub const DP2_MAP_HEIGHT: f64 = 380.0;
pub const DP5_MAP_HEIGHT: f64 = 380.0;
pub const DP6_MAP_HEIGHT: f64 = 420.0;
pub const DP7_MAP_HEIGHT: f64 = 420.0;
pub const DP4_ROOF_SIZE: f64 = 180.0;
pub const DP4_TABLE_WIDTH: f64 = 310.0;

/// Échelles des cartes
pub const SCALE_DP1_NEAR: f64 = 1000.0;
pub const SCALE_DP1_MID: f64 = 2000.0;
pub const SCALE_DP1_FAR: f64 = 5000.0;
pub const SCALE_DP2: f64 = 250.0;
pub const SCALE_DP4: f64 = 200.0;
pub const SCALE_DP5: f64 = 500.0;

/// Opacité du calque cadastral sur l'orthophoto (DP2)
pub const CADASTRE_OPACITY: f32 = 0.55;

/// Positions des zones d'image, dérivées de la géométrie de page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub content_left: f64,
    pub content_top: f64,
    pub content_width: f64,
}

impl Layout {
    pub fn new(geometry: &PageGeometry) -> Self {
        Self {
            content_left: geometry.content_left(),
            content_top: geometry.content_top(),
            content_width: geometry.content_width(),
        }
    }

    /// Ordonnée des images sous le titre
    pub fn map_y(&self) -> f64 {
        self.content_top + 30.0
    }

    pub fn dp1_half_width(&self) -> f64 {
        (self.content_width - DP1_GAP) / 2.0
    }

    /// Plan (gauche) et orthophoto (droite) de la page DP1 1/1000
    pub fn dp1_pair(&self) -> (PageRect, PageRect) {
        let w = self.dp1_half_width();
        let y = self.map_y();
        (
            PageRect::new(self.content_left, y, w, DP1_MAP_HEIGHT),
            PageRect::new(self.content_left + w + DP1_GAP, y, w, DP1_MAP_HEIGHT),
        )
    }

    pub fn dp1_single(&self) -> PageRect {
        PageRect::new(self.content_left, self.map_y(), self.content_width, DP1_SINGLE_HEIGHT)
    }

    pub fn full_width(&self, height: f64) -> PageRect {
        PageRect::new(self.content_left, self.map_y(), self.content_width, height)
    }

    /// Origine du tableau DP4
    pub fn dp4_table(&self) -> (f64, f64) {
        (self.content_left, self.content_top + 10.0)
    }

    pub fn dp4_roof(&self) -> PageRect {
        let (x, y) = self.dp4_table();
        PageRect::new(x + DP4_TABLE_WIDTH + 30.0, y, DP4_ROOF_SIZE, DP4_ROOF_SIZE)
    }

    /// Vues DP7 (haut) et DP8 (bas) sur une même page
    pub fn dp7_dp8(&self) -> (PageRect, PageRect) {
        let y = self.content_top + 24.0;
        let half = (DP7_MAP_HEIGHT * 0.48).round();
        let second_y = y + half + 26.0;
        (
            PageRect::new(self.content_left, y, self.content_width, half),
            PageRect::new(self.content_left, second_y, self.content_width, half),
        )
    }
}

/// Cadre physique (mm) d'une zone d'image
pub fn frame_of(rect: PageRect) -> MapFrame {
    MapFrame::new(pt_to_mm(rect.width), pt_to_mm(rect.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp1_pair() {
        let layout = Layout::new(&PageGeometry::default());
        let (plan, ortho) = layout.dp1_pair();
        assert_eq!(plan.y, 118.0);
        assert!((plan.width - 374.945).abs() < 1e-9);
        assert!((ortho.x - (38.0 + 374.945 + 16.0)).abs() < 1e-9);
    }

    #[test]
    fn test_maps_stay_above_footer() {
        let geometry = PageGeometry::default();
        let layout = Layout::new(&geometry);
        let footer_y = geometry.height - geometry.margin - 20.0 - 6.0;
        for rect in [
            layout.dp1_single(),
            layout.full_width(DP2_MAP_HEIGHT),
            layout.full_width(DP6_MAP_HEIGHT),
            layout.dp7_dp8().1,
        ] {
            assert!(rect.bottom() < footer_y, "{:?}", rect);
        }
    }

    #[test]
    fn test_dp7_dp8() {
        let (near, far) = Layout::new(&PageGeometry::default()).dp7_dp8();
        assert_eq!(near.y, 112.0);
        assert_eq!(near.height, 202.0);
        assert_eq!(far.y, 340.0);
    }

    #[test]
    fn test_frame_of() {
        let frame = frame_of(PageRect::new(0.0, 0.0, 72.0, 36.0));
        assert!((frame.width_mm - 25.4).abs() < 1e-12);
        assert!((frame.ratio() - 2.0).abs() < 1e-12);
    }
}
