//! Types de données pour le crate dpgeo

use geo::{coord, Coord, Point, Rect};
use serde::{Deserialize, Serialize};

/// Emprise en coordonnées projetées (mètres, Lambert 93)
///
/// Équivalent de `[minx, miny, maxx, maxy]`.
pub type BBox = Rect<f64>;

/// Construit une emprise depuis ses quatre bornes
pub fn bbox(minx: f64, miny: f64, maxx: f64, maxy: f64) -> BBox {
    Rect::new(coord! { x: minx, y: miny }, coord! { x: maxx, y: maxy })
}

/// Retourne les bornes `[minx, miny, maxx, maxy]` d'une emprise
pub fn bbox_bounds(b: &BBox) -> [f64; 4] {
    [b.min().x, b.min().y, b.max().x, b.max().y]
}

/// Point géographique WGS84 (degrés décimaux)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}

/// Point projeté Lambert 93 (EPSG:2154), en mètres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertPoint {
    pub x: f64,
    pub y: f64,
}

impl LambertPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<LambertPoint> for Coord<f64> {
    fn from(p: LambertPoint) -> Self {
        coord! { x: p.x, y: p.y }
    }
}

/// Zone physique réservée à une carte sur la page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl MapFrame {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self { width_mm, height_mm }
    }

    /// Rapport largeur / hauteur
    pub fn ratio(&self) -> f64 {
        self.width_mm / self.height_mm
    }
}

/// Résultat du géocodage d'une adresse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lon: f64,
    /// Libellé normalisé retourné par le service
    pub label: String,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub citycode: Option<String>,
}

impl GeocodeResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Référence cadastrale d'une parcelle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParcelInfo {
    /// « section numero », ou identifiant unique, ou chaîne vide
    pub reference: String,
    pub section: Option<String>,
    pub numero: Option<String>,
    pub feuille: Option<String>,
    pub commune: Option<String>,
    pub insee_code: Option<String>,
}

/// Format d'image demandé au service WMS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG avec canal alpha (plans, surcouches)
    #[default]
    Png,
    /// JPEG (orthophotographies)
    Jpeg,
}

impl ImageFormat {
    /// Type MIME attendu par le paramètre FORMAT
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Extension de fichier conventionnelle
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Une requête GetMap unitaire
#[derive(Debug, Clone, PartialEq)]
pub struct WmsRequest {
    pub layer: String,
    pub bbox: BBox,
    pub width_px: u32,
    pub height_px: u32,
    pub format: ImageFormat,
    pub transparent: bool,
    pub dpi: Option<u32>,
}

impl WmsRequest {
    /// Copie de la requête restreinte à une sous-emprise et une taille en pixels
    pub fn with_extent(&self, bbox: BBox, width_px: u32, height_px: u32) -> Self {
        Self {
            bbox,
            width_px,
            height_px,
            ..self.clone()
        }
    }
}
