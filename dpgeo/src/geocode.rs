//! Lecture des réponses du service de géocodage (GeoJSON)

use geojson::{Feature, GeoJson, Value};

use crate::types::GeocodeResult;
use crate::DpGeoError;

const SOURCE: &str = "geocodage";

/// Extrait le premier résultat d'une réponse de géocodage
///
/// Aucune désambiguïsation : le premier candidat est retenu.
pub fn parse_geocode_response(body: &str, address: &str) -> Result<GeocodeResult, DpGeoError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e: geojson::Error| DpGeoError::invalid_response(SOURCE, e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DpGeoError::invalid_response(SOURCE, "FeatureCollection attendue"));
    };

    let Some(feature) = collection.features.first() else {
        return Err(DpGeoError::AddressNotFound(address.to_string()));
    };

    let (lon, lat) = point_coordinates(feature)?;

    Ok(GeocodeResult {
        lat,
        lon,
        label: property_string(feature, "label").unwrap_or_else(|| address.to_string()),
        city: property_string(feature, "city"),
        postcode: property_string(feature, "postcode"),
        citycode: property_string(feature, "citycode"),
    })
}

/// Coordonnées `[lon, lat]` d'une feature ponctuelle
fn point_coordinates(feature: &Feature) -> Result<(f64, f64), DpGeoError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| DpGeoError::invalid_response(SOURCE, "géométrie absente"))?;

    match &geometry.value {
        Value::Point(position) if position.len() >= 2 => Ok((position[0], position[1])),
        _ => Err(DpGeoError::invalid_response(SOURCE, "Point attendu")),
    }
}

/// Valeur textuelle non vide d'une propriété (les nombres sont convertis)
pub(crate) fn property_string(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
