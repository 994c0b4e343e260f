//! Propriétés de la chaîne projection → cadrage → tuiles

use dpgeo::tiling::grid_dims;
use dpgeo::{bbox_from_scale, from_lambert93, partition, to_lambert93, LambertPoint, MapFrame};
use dpgeo::MAX_TILE_SIZE;

#[test]
fn test_round_trip_over_metropole() {
    let mut worst: f64 = 0.0;

    for x in (150_000..=1_200_000).step_by(75_000) {
        for y in (6_050_000..=7_100_000).step_by(75_000) {
            let p = LambertPoint::new(x as f64 + 0.37, y as f64 + 0.61);
            let back = to_lambert93(from_lambert93(p).unwrap()).unwrap();
            worst = worst.max((back.x - p.x).abs()).max((back.y - p.y).abs());
        }
    }

    assert!(worst < 0.01, "écart maximal {} m", worst);
}

#[test]
fn test_tile_count_matches_ceil_division() {
    let center = LambertPoint::new(652381.0, 6862047.0);

    for (w_mm, h_mm) in [(132.27, 148.17), (270.19, 148.17), (270.19, 134.06), (63.5, 63.5)] {
        for dpi in [96u32, 150, 300, 400] {
            let f = bbox_from_scale(center, 2000.0, MapFrame::new(w_mm, h_mm), dpi).unwrap();
            let tiles = partition(f.bbox, f.width_px, f.height_px, MAX_TILE_SIZE);

            let expected = f.width_px.div_ceil(MAX_TILE_SIZE) * f.height_px.div_ceil(MAX_TILE_SIZE);
            assert_eq!(tiles.len() as u32, expected);
            assert_eq!(
                grid_dims(f.width_px, f.height_px, MAX_TILE_SIZE),
                (f.width_px.div_ceil(MAX_TILE_SIZE), f.height_px.div_ceil(MAX_TILE_SIZE))
            );

            // Les tuiles couvrent exactement l'emprise complète
            let minx = tiles.iter().map(|t| t.bbox.min().x).fold(f64::INFINITY, f64::min);
            let maxy = tiles.iter().map(|t| t.bbox.max().y).fold(f64::NEG_INFINITY, f64::max);
            assert!((minx - f.bbox.min().x).abs() < 1e-6);
            assert!((maxy - f.bbox.max().y).abs() < 1e-6);

            for t in &tiles {
                assert!(t.width <= MAX_TILE_SIZE && t.height <= MAX_TILE_SIZE);
                // Même résolution au sol que l'image complète
                let mpp_x = t.bbox.width() / f64::from(t.width);
                assert!((mpp_x - f.meters_per_pixel).abs() < 1e-9);
            }
        }
    }
}
