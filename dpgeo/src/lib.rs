//! # dpgeo
//!
//! Géodonnées pour la génération des dossiers de Déclaration Préalable.
//!
//! ## Features
//!
//! - Reprojection WGS84 ↔ Lambert 93 (EPSG:2154) en Rust pur
//! - Cadrage d'une carte à l'échelle (cadre en mm, résolution en dpi)
//! - Découpage des requêtes WMS trop grandes en grille de tuiles
//! - Lecture des réponses GeoJSON du géocodage et du cadastre
//!
//! Aucune entrée/sortie : tout ce qui touche au réseau vit dans `dp-pack`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dpgeo::{bbox_from_scale, to_lambert93, GeoPoint, MapFrame};
//!
//! let center = to_lambert93(GeoPoint::new(49.2317, -0.0449))?;
//! let framing = bbox_from_scale(center, 1000.0, MapFrame::new(132.3, 148.2), 300)?;
//! println!("{} x {} px", framing.width_px, framing.height_px);
//! ```

pub mod cadastre;
pub mod error;
pub mod framing;
pub mod geocode;
pub mod projection;
pub mod tiling;
pub mod types;
pub mod wms;

pub use error::DpGeoError;
pub use framing::{bbox_from_scale, Framing};
pub use projection::{from_lambert93, to_lambert93};
pub use tiling::{partition, TileSpec, MAX_TILE_SIZE};
pub use types::{
    bbox, bbox_bounds, BBox, GeoPoint, GeocodeResult, ImageFormat, LambertPoint, MapFrame,
    ParcelInfo, WmsRequest,
};
