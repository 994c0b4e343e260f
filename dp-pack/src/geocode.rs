//! Géocodage d'une adresse libre

use anyhow::{Context, Result};
use dpgeo::geocode::parse_geocode_response;
use dpgeo::GeocodeResult;
use tracing::{debug, info};

use crate::net::HttpClient;

/// Résout une adresse en coordonnées WGS84
///
/// Seul le premier candidat est retenu. Échoue avec « Adresse non trouvee »
/// si le service ne renvoie aucun résultat.
pub async fn geocode_address(http: &HttpClient, endpoint: &str, address: &str) -> Result<GeocodeResult> {
    let address = address.trim();
    if address.is_empty() {
        anyhow::bail!("Adresse vide");
    }

    debug!(endpoint, address, "Géocodage");
    let query = [("q", address.to_string()), ("limit", "1".to_string())];
    let body = http
        .fetch_text(endpoint, &query)
        .await
        .with_context(|| format!("Geocoding request failed for '{}'", address))?;

    let result = parse_geocode_response(&body, address)?;

    info!(
        address,
        label = %result.label,
        lat = result.lat,
        lon = result.lon,
        "Adresse géocodée (premier candidat)"
    );
    Ok(result)
}
