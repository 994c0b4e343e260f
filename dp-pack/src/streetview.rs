//! Vues au niveau de la rue (API Street View statique)

use bytes::Bytes;
use dpgeo::GeoPoint;
use serde::Serialize;
use tracing::debug;

use crate::net::HttpClient;

/// Largeur des vues de rue (px)
pub const STREET_VIEW_WIDTH: u32 = 1600;
/// Hauteur des vues de rue (px)
pub const STREET_VIEW_HEIGHT: u32 = 1200;

/// Paramètres de prise de vue
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreetViewRequest {
    pub location: GeoPoint,
    pub width: u32,
    pub height: u32,
    /// Champ de vision (degrés)
    pub fov: u32,
    /// Inclinaison verticale (degrés)
    pub pitch: i32,
    /// Cap (degrés)
    pub heading: u32,
}

impl StreetViewRequest {
    fn at(location: GeoPoint, fov: u32, pitch: i32, heading: u32) -> Self {
        Self {
            location,
            width: STREET_VIEW_WIDTH,
            height: STREET_VIEW_HEIGHT,
            fov,
            pitch,
            heading,
        }
    }

    /// Vue DP6 (insertion photographique)
    pub fn dp6(location: GeoPoint) -> Self {
        Self::at(location, 90, 10, 0)
    }

    /// Vue DP7 (environnement proche)
    pub fn dp7(location: GeoPoint) -> Self {
        Self::at(location, 80, 8, 0)
    }

    /// Vue DP8 (environnement lointain)
    pub fn dp8(location: GeoPoint) -> Self {
        Self::at(location, 110, 5, 20)
    }

    /// Paramètres de requête, clé d'API incluse
    pub fn query(&self, api_key: &str) -> Vec<(&'static str, String)> {
        vec![
            ("size", format!("{}x{}", self.width, self.height)),
            ("location", format!("{},{}", self.location.lat, self.location.lon)),
            ("fov", self.fov.to_string()),
            ("pitch", self.pitch.to_string()),
            ("heading", self.heading.to_string()),
            ("key", api_key.to_string()),
        ]
    }
}

/// Erreur de récupération d'une vue de rue
#[derive(Debug, thiserror::Error)]
pub enum StreetViewError {
    #[error("GOOGLE_MAPS_API_KEY manquant")]
    MissingApiKey,
    #[error("vue de rue indisponible")]
    Unavailable,
}

/// Télécharge une vue de rue (JPEG)
pub async fn fetch_street_view(
    http: &HttpClient,
    endpoint: &str,
    api_key: Option<&str>,
    request: &StreetViewRequest,
) -> Result<Bytes, StreetViewError> {
    let key = api_key
        .filter(|k| !k.trim().is_empty())
        .ok_or(StreetViewError::MissingApiKey)?;

    debug!(
        fov = request.fov,
        pitch = request.pitch,
        heading = request.heading,
        "Vue de rue"
    );
    http.fetch_bytes_or_none(endpoint, &request.query(key))
        .await
        .ok_or(StreetViewError::Unavailable)
}
