//! Paramètres de requête WMS 1.3.0 GetMap (CRS EPSG:2154)

use crate::types::{bbox_bounds, WmsRequest};

/// Plan IGN v2
pub const LAYER_PLAN: &str = "GEOGRAPHICALGRIDSYSTEMS.PLANIGNV2";
/// Orthophotographies
pub const LAYER_ORTHO: &str = "ORTHOIMAGERY.ORTHOPHOTOS";
/// Parcellaire Express
pub const LAYER_CADASTRE: &str = "CADASTRALPARCELS.PARCELLAIRE_EXPRESS";

/// Système de coordonnées des requêtes
pub const WMS_CRS: &str = "EPSG:2154";

/// Construit les paramètres de requête GetMap
pub fn get_map_params(request: &WmsRequest) -> Vec<(&'static str, String)> {
    let [minx, miny, maxx, maxy] = bbox_bounds(&request.bbox);

    let mut params = vec![
        ("SERVICE", "WMS".to_string()),
        ("VERSION", "1.3.0".to_string()),
        ("REQUEST", "GetMap".to_string()),
        ("LAYERS", request.layer.clone()),
        ("STYLES", String::new()),
        ("CRS", WMS_CRS.to_string()),
        ("BBOX", format!("{},{},{},{}", minx, miny, maxx, maxy)),
        ("WIDTH", request.width_px.to_string()),
        ("HEIGHT", request.height_px.to_string()),
        ("FORMAT", request.format.mime().to_string()),
        (
            "TRANSPARENT",
            if request.transparent { "TRUE" } else { "FALSE" }.to_string(),
        ),
    ];

    if let Some(dpi) = request.dpi {
        params.push(("FORMAT_OPTIONS", format!("dpi:{}", dpi)));
    }

    params
}
