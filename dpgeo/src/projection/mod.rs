//! Reprojection WGS84 ↔ Lambert 93 (EPSG:2154) en Rust pur
//!
//! Les transformations sont pures et sans état : un `LambertPoint` est
//! recalculé à chaque usage depuis le `GeoPoint` source.

mod ellipsoid;
mod lambert;

pub use lambert::LambertConformalConic;

use crate::types::{GeoPoint, LambertPoint};
use crate::DpGeoError;

/// Convertit un point WGS84 en Lambert 93
pub fn to_lambert93(point: GeoPoint) -> Result<LambertPoint, DpGeoError> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(DpGeoError::InvalidCoordinate(format!(
            "lat={}, lon={}",
            point.lat, point.lon
        )));
    }
    if point.lat.abs() >= 90.0 {
        return Err(DpGeoError::InvalidCoordinate(format!(
            "latitude hors domaine: {}",
            point.lat
        )));
    }

    let (x, y) = LambertConformalConic::lambert93()
        .forward(point.lon.to_radians(), point.lat.to_radians());
    Ok(LambertPoint::new(x, y))
}

/// Convertit un point Lambert 93 en WGS84
pub fn from_lambert93(point: LambertPoint) -> Result<GeoPoint, DpGeoError> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(DpGeoError::InvalidCoordinate(format!(
            "x={}, y={}",
            point.x, point.y
        )));
    }

    let (lon, lat) = LambertConformalConic::lambert93().inverse(point.x, point.y);
    Ok(GeoPoint::new(lat.to_degrees(), lon.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_below_centimeter() {
        let samples = [
            LambertPoint::new(700000.0, 6600000.0),
            LambertPoint::new(652381.0, 6862047.0),
            LambertPoint::new(453210.5, 6905432.25),
            LambertPoint::new(1050000.0, 6300000.0),
            LambertPoint::new(180000.0, 6780000.0),
            LambertPoint::new(1200000.0, 6100000.0),
        ];

        for p in samples {
            let back = to_lambert93(from_lambert93(p).unwrap()).unwrap();
            assert!((back.x - p.x).abs() < 0.01, "{:?} -> {:?}", p, back);
            assert!((back.y - p.y).abs() < 0.01, "{:?} -> {:?}", p, back);
        }
    }

    #[test]
    fn test_dozule() {
        // 14 Rue Emile Nicol, Dozulé (Calvados)
        let p = to_lambert93(GeoPoint::new(49.2317, -0.0449)).unwrap();
        assert!((p.x - 475000.0).abs() < 10000.0, "x={}", p.x);
        assert!((p.y - 6908000.0).abs() < 10000.0, "y={}", p.y);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(to_lambert93(GeoPoint::new(f64::NAN, 2.0)).is_err());
        assert!(from_lambert93(LambertPoint::new(f64::INFINITY, 0.0)).is_err());
    }
}
