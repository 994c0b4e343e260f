//! Découpage d'une requête raster trop grande en grille de tuiles
//!
//! Fonction pure : (emprise, taille en pixels, taille de tuile) → liste de
//! (sous-emprise, décalage en pixels). L'axe vertical est inversé : la ligne
//! de pixels 0 correspond à `maxy`.

use tracing::debug;

use crate::types::{bbox, BBox};

/// Taille maximale d'une tuile, par côté, acceptée par le service WMS
pub const MAX_TILE_SIZE: u32 = 2048;

/// Une tuile de la grille
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSpec {
    /// Sous-emprise de la tuile
    pub bbox: BBox,
    /// Décalage horizontal dans l'image finale
    pub x: u32,
    /// Décalage vertical dans l'image finale
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Nombre de colonnes et de lignes nécessaires
pub fn grid_dims(width: u32, height: u32, tile_size: u32) -> (u32, u32) {
    let tile = tile_size.max(1);
    (width.div_ceil(tile), height.div_ceil(tile))
}

/// Indique si une image tient dans une seule requête
pub fn fits_single_request(width: u32, height: u32, tile_size: u32) -> bool {
    width <= tile_size && height <= tile_size
}

/// Découpe l'image `width × height` en tuiles d'au plus `tile_size` pixels
///
/// Les tuiles sont listées ligne par ligne, de gauche à droite.
pub fn partition(full: BBox, width: u32, height: u32, tile_size: u32) -> Vec<TileSpec> {
    let tile = tile_size.max(1);
    let (cols, rows) = grid_dims(width, height, tile);
    let mut tiles = Vec::with_capacity((cols * rows) as usize);

    if cols * rows > 1 {
        debug!(cols, rows, width, height, "Découpage en tuiles");
    }

    for row in 0..rows {
        for col in 0..cols {
            let x = col * tile;
            let y = row * tile;
            let w = tile.min(width - x);
            let h = tile.min(height - y);

            tiles.push(TileSpec {
                bbox: bbox_for_tile(full, width, height, x, y, w, h),
                x,
                y,
                width: w,
                height: h,
            });
        }
    }

    tiles
}

/// Sous-emprise d'une fenêtre de pixels par interpolation linéaire
pub fn bbox_for_tile(
    full: BBox,
    full_width: u32,
    full_height: u32,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> BBox {
    let span_x = full.width();
    let span_y = full.height();
    let fw = f64::from(full_width);
    let fh = f64::from(full_height);

    let x0 = full.min().x + (f64::from(x) / fw) * span_x;
    let x1 = full.min().x + (f64::from(x + w) / fw) * span_x;

    let y_top = full.max().y - (f64::from(y) / fh) * span_y;
    let y_bottom = full.max().y - (f64::from(y + h) / fh) * span_y;

    bbox(x0, y_bottom, x1, y_top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_tile_when_small() {
        let full = bbox(0.0, 0.0, 100.0, 50.0);
        let tiles = partition(full, 2048, 1024, MAX_TILE_SIZE);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].bbox, full);
        assert!(fits_single_request(2048, 2048, MAX_TILE_SIZE));
        assert!(!fits_single_request(2049, 10, MAX_TILE_SIZE));
    }

    #[test]
    fn test_grid_covers_image_exactly() {
        let full = bbox(1000.0, 2000.0, 1500.0, 2300.0);
        let (w, h) = (5000, 2100);
        let tiles = partition(full, w, h, MAX_TILE_SIZE);

        assert_eq!(grid_dims(w, h, MAX_TILE_SIZE), (3, 2));
        assert_eq!(tiles.len(), 6);

        let area: u64 = tiles.iter().map(|t| u64::from(t.width) * u64::from(t.height)).sum();
        assert_eq!(area, u64::from(w) * u64::from(h));

        let last = tiles.last().unwrap();
        assert_eq!((last.x, last.y, last.width, last.height), (4096, 2048, 904, 52));
    }

    #[test]
    fn test_vertical_axis_is_inverted() {
        let full = bbox(0.0, 0.0, 400.0, 400.0);
        let tiles = partition(full, 4000, 4000, MAX_TILE_SIZE);

        // Première tuile (en haut à gauche) : touche maxy
        assert_eq!(tiles[0].bbox.max().y, 400.0);
        assert_eq!(tiles[0].bbox.min().x, 0.0);

        // Tuile de la deuxième ligne : touche miny
        let bottom_left = tiles.iter().find(|t| t.x == 0 && t.y == 2048).unwrap();
        assert!((bottom_left.bbox.min().y - 0.0).abs() < 1e-9);
        assert!((bottom_left.bbox.max().y - (400.0 - 2048.0 / 10.0)).abs() < 1e-9);
    }

    #[test]
    fn test_tiles_share_edges() {
        let full = bbox(10.0, 20.0, 110.0, 70.0);
        let tiles = partition(full, 3000, 3000, MAX_TILE_SIZE);
        let a = tiles.iter().find(|t| t.x == 0 && t.y == 0).unwrap();
        let b = tiles.iter().find(|t| t.x == 2048 && t.y == 0).unwrap();
        assert!((a.bbox.max().x - b.bbox.min().x).abs() < 1e-9);
    }
}
