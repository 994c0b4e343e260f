//! Compositing des annotations cartographiques
//!
//! Toute la géométrie des annotations est dérivée des dimensions de l'image de
//! base : le placement reste juste quels que soient la résolution et le cadre.

pub mod raster;
pub mod svg;

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{imageops, RgbaImage};
use tracing::debug;

pub use raster::{
    blend_with_opacity, image_size, load_image, render_svg, save_image, write_placeholder_image,
};
pub use svg::{
    escape_xml, placeholder_svg, svg_center_point, svg_dotted_circle, svg_house_outline,
    svg_info_box, svg_legend_box, svg_north_arrow, svg_panel_rects, PanelRect,
};

/// Libellé de la légende des panneaux
pub const PANEL_LEGEND: &str = "Panneaux photovoltaiques";

/// Une annotation SVG à composer à un décalage en pixels
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub svg: String,
    pub left: i64,
    pub top: i64,
}

impl OverlaySpec {
    pub fn new(svg: String) -> Self {
        Self { svg, left: 0, top: 0 }
    }
}

fn round(v: f64) -> i64 {
    v.round() as i64
}

/// Compose les annotations sur l'image, dans l'ordre de la liste
pub fn composite_overlays(base: &mut RgbaImage, overlays: &[OverlaySpec]) -> Result<()> {
    for overlay in overlays {
        let layer = render_svg(&overlay.svg)?;
        imageops::overlay(base, &layer, overlay.left, overlay.top);
    }
    Ok(())
}

/// Compose une liste d'annotations sur l'image de base et écrit le résultat
pub fn overlay_svgs_on_image(base_path: &Path, overlays: &[OverlaySpec], out_path: &Path) -> Result<PathBuf> {
    let mut base = load_image(base_path)?;
    composite_overlays(&mut base, overlays)?;
    debug!(
        base = %base_path.display(),
        out = %out_path.display(),
        overlays = overlays.len(),
        "Annotations composées"
    );
    save_image(base, out_path)
}

/// Comme `overlay_svgs_on_image`, avec des annotations calculées d'après la
/// taille de l'image de base
pub fn overlay_sized_on_image<F>(base_path: &Path, out_path: &Path, specs: F) -> Result<PathBuf>
where
    F: FnOnce(u32, u32) -> Vec<OverlaySpec>,
{
    let (width, height) = image_size(base_path)?;
    overlay_svgs_on_image(base_path, &specs(width, height), out_path)
}

/// Flèche du nord : 12 % du petit côté, près du coin haut droit
pub fn north_arrow_spec(width: u32, height: u32) -> OverlaySpec {
    let size = round(f64::from(width.min(height)) * 0.12);
    let x = round(f64::from(width) - size as f64 * 0.8 - 20.0);
    OverlaySpec::new(svg_north_arrow(width, height, size, x, 24))
}

/// Jeu d'annotations DP1 : cercle de localisation, point central, flèche du nord
///
/// L'ordre garantit que le point est dessiné au-dessus du cercle.
pub fn dp1_overlay_specs(width: u32, height: u32) -> Vec<OverlaySpec> {
    let min = f64::from(width.min(height));
    let cx = round(f64::from(width) / 2.0);
    let cy = round(f64::from(height) / 2.0);
    let circle_radius = round(min * 0.1);
    let point_radius = round(min * 0.015).max(6);

    vec![
        OverlaySpec::new(svg_dotted_circle(width, height, cx, cy, circle_radius)),
        OverlaySpec::new(svg_center_point(width, height, cx, cy, point_radius)),
        north_arrow_spec(width, height),
    ]
}

/// Ajoute le jeu DP1 complet à une image
pub fn add_dp1_overlays(base_path: &Path, out_path: &Path) -> Result<PathBuf> {
    overlay_sized_on_image(base_path, out_path, dp1_overlay_specs)
}

/// Ajoute uniquement la flèche du nord (plan 1/1000)
pub fn add_north_arrow(base_path: &Path, out_path: &Path) -> Result<PathBuf> {
    overlay_sized_on_image(base_path, out_path, |w, h| vec![north_arrow_spec(w, h)])
}

/// Plan de masse APRES : trois panneaux alignés et légende
pub fn dp2_panel_specs(width: u32, height: u32) -> Vec<OverlaySpec> {
    let (w, h) = (f64::from(width), f64::from(height));
    let panel_w = round(w * 0.08) as f64;
    let panel_h = round(h * 0.045) as f64;
    let start_x = round(w * 0.4) as f64;
    let start_y = round(h * 0.42) as f64;

    let panels: Vec<PanelRect> = (0..3)
        .map(|i| PanelRect::new(start_x + (panel_w + 12.0) * i as f64, start_y, panel_w, panel_h))
        .collect();

    vec![
        OverlaySpec::new(svg_panel_rects(width, height, &panels)),
        OverlaySpec::new(svg_legend_box(
            width,
            height,
            round(w * 0.06),
            round(h * 0.08),
            200,
            28,
            PANEL_LEGEND,
        )),
    ]
}

/// Insertion graphique DP5 : contour de maison, panneaux sur le toit, légende
pub fn dp5_overlay_specs(width: u32, height: u32) -> Vec<OverlaySpec> {
    let (w, h) = (f64::from(width), f64::from(height));
    let house_w = round(w * 0.28);
    let house_h = round(h * 0.22);
    let house_x = round(w * 0.36);
    let house_y = round(h * 0.32);

    let panel_w = round(house_w as f64 * 0.22) as f64;
    let panel_h = round(house_h as f64 * 0.18) as f64;
    let (hx, hy) = (house_x as f64, house_y as f64);
    let panels = [
        (0.2, 0.6),
        (1.5, 0.6),
        (2.8, 0.6),
        (0.2, 1.8),
        (1.5, 1.8),
    ]
    .iter()
    .map(|&(kx, ky)| PanelRect::new(hx + panel_w * kx, hy + panel_h * ky, panel_w, panel_h))
    .collect::<Vec<_>>();

    vec![
        OverlaySpec::new(svg_house_outline(width, height, house_x, house_y, house_w, house_h)),
        OverlaySpec::new(svg_panel_rects(width, height, &panels)),
        OverlaySpec::new(svg_legend_box(
            width,
            height,
            round(w * 0.05),
            round(h * 0.82),
            190,
            28,
            PANEL_LEGEND,
        )),
    ]
}

/// Insertion photographique DP6 : quatre panneaux en 2×2 et encadré descriptif
pub fn dp6_overlay_specs(width: u32, height: u32) -> Vec<OverlaySpec> {
    let (w, h) = (f64::from(width), f64::from(height));
    let panel_w = round(w * 0.12) as f64;
    let panel_h = round(h * 0.06) as f64;
    let start_x = round(w * 0.43) as f64;
    let start_y = round(h * 0.48) as f64;

    let panels = [
        PanelRect::new(start_x, start_y, panel_w, panel_h),
        PanelRect::new(start_x + panel_w + 10.0, start_y, panel_w, panel_h),
        PanelRect::new(start_x, start_y + panel_h + 8.0, panel_w, panel_h),
        PanelRect::new(start_x + panel_w + 10.0, start_y + panel_h + 8.0, panel_w, panel_h),
    ];

    vec![
        OverlaySpec::new(svg_panel_rects(width, height, &panels)),
        OverlaySpec::new(svg_info_box(
            width,
            height,
            round(w * 0.05),
            round(h * 0.08),
            220,
            80,
            "Installation projete",
            &["Panneaux noirs mats", "Pose en surimposition"],
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const POINT_FILL: [u8; 4] = [0xF5, 0x9E, 0x0B, 0xFF];

    fn center_after_dp1(width: u32, height: u32) -> [u8; 4] {
        let mut base = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        composite_overlays(&mut base, &dp1_overlay_specs(width, height)).unwrap();
        base.get_pixel(width / 2, height / 2).0
    }

    #[test]
    fn test_dp1_order_and_geometry() {
        let specs = dp1_overlay_specs(800, 600);
        assert_eq!(specs.len(), 3);
        assert!(specs[0].svg.contains("stroke-dasharray"));
        assert!(specs[0].svg.contains(r#"cx="400" cy="300" r="60""#));
        assert!(specs[1].svg.contains(r#"cx="400" cy="300" r="9""#));
        assert!(specs[2].svg.contains("<polygon"));
    }

    #[test]
    fn test_point_radius_minimum() {
        let specs = dp1_overlay_specs(200, 100);
        assert!(specs[1].svg.contains(r#"r="6""#));
    }

    #[test]
    fn test_center_point_at_image_center() {
        assert_eq!(center_after_dp1(800, 600), POINT_FILL);
        assert_eq!(center_after_dp1(2000, 1500), POINT_FILL);
    }

    #[test]
    fn test_north_arrow_position() {
        // 800×600 : taille 72, x = round(800 - 57.6 - 20) = 722
        let spec = north_arrow_spec(800, 600);
        assert!(spec.svg.contains(r#"points="743.5,24 765,96 722,96""#));
    }

    #[test]
    fn test_add_dp1_overlays_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        let out = dir.path().join("out.png");
        save_image(RgbaImage::from_pixel(400, 300, Rgba([255, 255, 255, 255])), &base).unwrap();

        add_dp1_overlays(&base, &out).unwrap();
        let img = load_image(&out).unwrap();
        assert_eq!(img.dimensions(), (400, 300));
        assert_eq!(img.get_pixel(200, 150).0, POINT_FILL);
    }

    #[test]
    fn test_overlay_offsets_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.png");
        let out = dir.path().join("out.png");
        save_image(RgbaImage::from_pixel(100, 80, Rgba([255, 255, 255, 255])), &base).unwrap();

        let square = |fill: &str| {
            format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="{}"/></svg>"#,
                fill
            )
        };
        let overlays = [
            OverlaySpec { svg: square("#FF0000"), left: 20, top: 30 },
            OverlaySpec { svg: square("#0000FF"), left: 25, top: 30 },
        ];
        overlay_svgs_on_image(&base, &overlays, &out).unwrap();

        let img = load_image(&out).unwrap();
        assert_eq!(img.dimensions(), (100, 80));
        assert_eq!(img.get_pixel(21, 31).0, [255, 0, 0, 255]);
        // le second recouvre le premier
        assert_eq!(img.get_pixel(27, 35).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_page_overlay_sets() {
        assert_eq!(dp2_panel_specs(1000, 500).len(), 2);
        assert_eq!(dp5_overlay_specs(1000, 500).len(), 3);
        let dp6 = dp6_overlay_specs(1600, 1200);
        assert!(dp6[1].svg.contains("Installation projete"));
        assert!(dp6[0].svg.contains(r#"x="688.0" y="576.0" width="192.0" height="72.0""#));
    }
}
