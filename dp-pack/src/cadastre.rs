//! Résolution de la parcelle cadastrale sous un point

use dpgeo::cadastre::{parse_parcel_response, point_query};
use dpgeo::{GeoPoint, ParcelInfo};
use tracing::{debug, info, warn};

use crate::lookup::Lookup;
use crate::net::HttpClient;

/// Interroge le registre parcellaire avec un point GeoJSON
///
/// Ne retourne jamais d'erreur : statut non 2xx, réponse illisible ou liste
/// de features vide ou parcelle sans référence donnent `Unavailable`.
pub async fn resolve_parcel(http: &HttpClient, endpoint: &str, point: GeoPoint) -> Lookup<ParcelInfo> {
    let geom = match point_query(point) {
        Ok(geom) => geom,
        Err(e) => return Lookup::unavailable(e.to_string()),
    };

    debug!(endpoint, geom = %geom, "Recherche de parcelle");
    let body = match http.fetch_text(endpoint, &[("geom", geom)]).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to fetch parcel: {}", e);
            return Lookup::unavailable(e.to_string());
        }
    };

    match parse_parcel_response(&body) {
        Ok(Some(parcel)) if parcel.reference.is_empty() => {
            warn!("Parcel without section, numero or idu at {:.6}, {:.6}", point.lat, point.lon);
            Lookup::unavailable("référence cadastrale vide")
        }
        Ok(Some(parcel)) => {
            info!(reference = %parcel.reference, commune = ?parcel.commune, "Parcelle trouvée");
            Lookup::Found(parcel)
        }
        Ok(None) => {
            warn!("No parcel found at {:.6}, {:.6}", point.lat, point.lon);
            Lookup::unavailable("aucune parcelle à cet emplacement")
        }
        Err(e) => {
            warn!("Failed to parse parcel response: {}", e);
            Lookup::unavailable(e.to_string())
        }
    }
}

/// Variante nullable : `None` quand la parcelle est indisponible
pub async fn get_parcel_ref(http: &HttpClient, endpoint: &str, lat: f64, lon: f64) -> Option<ParcelInfo> {
    resolve_parcel(http, endpoint, GeoPoint::new(lat, lon)).await.found()
}
