//! Cadrage d'une carte à l'échelle
//!
//! Relie une échelle (« 1/1000 ») à la taille physique du cadre sur la page et
//! à la résolution d'impression : l'emprise couvre `cadre_mm × échelle / 1000`
//! mètres, l'image fait `cadre_mm / 25.4 × dpi` pixels.

use serde::Serialize;

use crate::types::{bbox, BBox, LambertPoint, MapFrame};
use crate::DpGeoError;

/// Millimètres par pouce
pub const MM_PER_INCH: f64 = 25.4;

/// Résultat du cadrage : emprise projetée et taille en pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Framing {
    #[serde(skip)]
    pub bbox: BBox,
    pub width_px: u32,
    pub height_px: u32,
    pub meters_per_pixel: f64,
}

/// Calcule l'emprise centrée sur `center` pour une échelle, un cadre et une résolution
pub fn bbox_from_scale(
    center: LambertPoint,
    scale: f64,
    frame: MapFrame,
    dpi: u32,
) -> Result<Framing, DpGeoError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(DpGeoError::InvalidFrame(format!("échelle invalide: {}", scale)));
    }
    if !(frame.width_mm > 0.0 && frame.height_mm > 0.0) {
        return Err(DpGeoError::InvalidFrame(format!(
            "cadre invalide: {} x {} mm",
            frame.width_mm, frame.height_mm
        )));
    }
    if dpi == 0 {
        return Err(DpGeoError::InvalidFrame("dpi nul".to_string()));
    }

    let width_px = pixels_for(frame.width_mm, dpi);
    let height_px = pixels_for(frame.height_mm, dpi);

    let width_m = frame.width_mm * scale / 1000.0;
    let height_m = frame.height_mm * scale / 1000.0;

    let bbox = bbox(
        center.x - width_m / 2.0,
        center.y - height_m / 2.0,
        center.x + width_m / 2.0,
        center.y + height_m / 2.0,
    );

    Ok(Framing {
        bbox,
        width_px,
        height_px,
        meters_per_pixel: width_m / f64::from(width_px.max(1)),
    })
}

/// Taille en pixels d'une longueur physique à une résolution donnée
pub fn pixels_for(length_mm: f64, dpi: u32) -> u32 {
    ((length_mm / MM_PER_INCH) * f64::from(dpi)).round().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_matches_frame() {
        let center = LambertPoint::new(478000.0, 6906000.0);
        let frames = [
            MapFrame::new(132.27, 148.17),
            MapFrame::new(270.19, 148.17),
            MapFrame::new(63.5, 63.5),
            MapFrame::new(297.0, 210.0),
        ];

        for frame in frames {
            for scale in [200.0, 250.0, 500.0, 1000.0, 2000.0, 5000.0] {
                for dpi in [72, 150, 300] {
                    let f = bbox_from_scale(center, scale, frame, dpi).unwrap();
                    let ratio = f.bbox.width() / f.bbox.height();
                    assert!((ratio - frame.ratio()).abs() < 1e-9, "ratio={}", ratio);
                }
            }
        }
    }

    #[test]
    fn test_pixels_and_spans() {
        let center = LambertPoint::new(700000.0, 6600000.0);
        let f = bbox_from_scale(center, 1000.0, MapFrame::new(254.0, 127.0), 300).unwrap();

        assert_eq!(f.width_px, 3000);
        assert_eq!(f.height_px, 1500);
        assert!((f.bbox.width() - 254.0).abs() < 1e-9);
        assert!((f.bbox.height() - 127.0).abs() < 1e-9);
        assert!((f.bbox.center().x - 700000.0).abs() < 1e-9);
        assert!((f.meters_per_pixel - 254.0 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let center = LambertPoint::new(0.0, 0.0);
        assert!(bbox_from_scale(center, 0.0, MapFrame::new(10.0, 10.0), 300).is_err());
        assert!(bbox_from_scale(center, 1000.0, MapFrame::new(0.0, 10.0), 300).is_err());
        assert!(bbox_from_scale(center, 1000.0, MapFrame::new(10.0, 10.0), 0).is_err());
    }
}
