//! Lecture des réponses du service de parcelles cadastrales

use geojson::{GeoJson, Geometry, Value};

use crate::geocode::property_string;
use crate::types::{GeoPoint, ParcelInfo};
use crate::DpGeoError;

const SOURCE: &str = "cadastre";

/// Paramètre `geom` : le point WGS84 encodé en GeoJSON
pub fn point_query(point: GeoPoint) -> Result<String, DpGeoError> {
    let geometry = Geometry::new(Value::Point(vec![point.lon, point.lat]));
    Ok(serde_json::to_string(&geometry)?)
}

/// Extrait la parcelle de la première feature, `None` si la collection est vide
pub fn parse_parcel_response(body: &str) -> Result<Option<ParcelInfo>, DpGeoError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e: geojson::Error| DpGeoError::invalid_response(SOURCE, e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DpGeoError::invalid_response(SOURCE, "FeatureCollection attendue"));
    };

    let Some(feature) = collection.features.first() else {
        return Ok(None);
    };
    if feature.properties.is_none() {
        return Ok(None);
    }

    let section = property_string(feature, "section");
    let numero = property_string(feature, "numero");
    let idu = property_string(feature, "idu");

    Ok(Some(ParcelInfo {
        reference: parcel_reference(section.as_deref(), numero.as_deref(), idu.as_deref()),
        section,
        numero,
        feuille: property_string(feature, "feuille"),
        commune: property_string(feature, "nom_com"),
        insee_code: property_string(feature, "code_insee"),
    }))
}

/// « section numero », sinon l'identifiant unique, sinon chaîne vide
pub fn parcel_reference(section: Option<&str>, numero: Option<&str>, idu: Option<&str>) -> String {
    let joined = [section, numero]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !joined.is_empty() {
        return joined;
    }
    idu.unwrap_or_default().to_string()
}
