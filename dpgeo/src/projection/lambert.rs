//! Projection conique conforme de Lambert à deux parallèles standards
//!
//! Les constantes de la projection (exposant `n`, constante `c`, rayon à
//! l'origine) sont calculées une fois à la construction.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::GRS80;

/// Paramètres d'une projection Lambert conique conforme sécante
#[derive(Debug, Clone, Copy)]
pub struct LambertConformalConic {
    /// Longitude origine (radians)
    lon0: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
    /// Excentricité de l'ellipsoïde
    e: f64,
    /// Exposant de la projection
    n: f64,
    /// Constante de la projection
    c: f64,
    /// Rayon du parallèle origine
    r0: f64,
}

impl LambertConformalConic {
    /// Lambert 93 (EPSG:2154) : parallèles 44°N / 49°N, origine 46.5°N 3°E
    pub fn lambert93() -> Self {
        Self::new(
            3.0_f64.to_radians(),
            46.5_f64.to_radians(),
            44.0_f64.to_radians(),
            49.0_f64.to_radians(),
            700000.0,
            6600000.0,
        )
    }

    fn new(lon0: f64, lat0: f64, lat1: f64, lat2: f64, x0: f64, y0: f64) -> Self {
        let a = GRS80::A;
        let e = GRS80::E;
        let e2 = GRS80::E2;

        let n1 = grande_normale(lat1, a, e2);
        let n2 = grande_normale(lat2, a, e2);

        let iso_lat1 = isometric_latitude(lat1, e);
        let iso_lat2 = isometric_latitude(lat2, e);
        let iso_lat0 = isometric_latitude(lat0, e);

        let n = ((n1 * lat1.cos()).ln() - (n2 * lat2.cos()).ln()) / (iso_lat2 - iso_lat1);
        let c = (n1 * lat1.cos() / n) * (n * iso_lat1).exp();
        let r0 = c * (-n * iso_lat0).exp();

        Self {
            lon0,
            x0,
            y0,
            e,
            n,
            c,
            r0,
        }
    }

    /// Géographique (radians) vers projeté (mètres)
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        let iso_lat = isometric_latitude(lat, self.e);
        let r = self.c * (-self.n * iso_lat).exp();
        let gamma = self.n * (lon - self.lon0);

        let x = self.x0 + r * gamma.sin();
        let y = self.y0 + self.r0 - r * gamma.cos();
        (x, y)
    }

    /// Projeté (mètres) vers géographique (radians)
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.x0;
        let dy = y - self.y0;

        let r = (dx.powi(2) + (self.r0 - dy).powi(2)).sqrt();
        let r = if self.n < 0.0 { -r } else { r };
        let gamma = (dx / (self.r0 - dy)).atan();

        let iso_lat = -(r / self.c).ln() / self.n;
        let lat = latitude_from_isometric(iso_lat, self.e);
        let lon = self.lon0 + gamma / self.n;
        (lon, lat)
    }
}

/// Calcule la latitude isométrique
fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
    ((FRAC_PI_4 + lat / 2.0).tan() * term).ln()
}

/// Calcule la latitude depuis la latitude isométrique (itératif)
fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - FRAC_PI_2;

    for _ in 0..20 {
        let sin_lat = lat.sin();
        let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
        let new_lat = 2.0 * (iso_lat.exp() * term).atan() - FRAC_PI_2;

        if (new_lat - lat).abs() < 1e-14 {
            return new_lat;
        }
        lat = new_lat;
    }
    lat
}

/// Grande normale (rayon de courbure dans le plan vertical)
fn grande_normale(lat: f64, a: f64, e2: f64) -> f64 {
    a / (1.0 - e2 * lat.sin().powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_false_origin() {
        let lcc = LambertConformalConic::lambert93();
        let (x, y) = lcc.forward(3.0_f64.to_radians(), 46.5_f64.to_radians());
        assert!((x - 700000.0).abs() < 1e-6, "x={}", x);
        assert!((y - 6600000.0).abs() < 1e-6, "y={}", y);
    }

    #[test]
    fn test_paris_inverse() {
        // Tour Eiffel approximativement
        let lcc = LambertConformalConic::lambert93();
        let (lon, lat) = lcc.inverse(648237.0, 6862107.0);

        assert!((lon.to_degrees() - 2.2945).abs() < 0.01, "lon={}", lon.to_degrees());
        assert!((lat.to_degrees() - 48.8584).abs() < 0.01, "lat={}", lat.to_degrees());
    }

    #[test]
    fn test_marseille_forward() {
        // Vieux-Port approximativement
        let lcc = LambertConformalConic::lambert93();
        let (x, y) = lcc.forward(5.37_f64.to_radians(), 43.30_f64.to_radians());

        assert!((x - 893193.0).abs() < 5000.0, "x={}", x);
        assert!((y - 6245829.0).abs() < 5000.0, "y={}", y);
    }
}
