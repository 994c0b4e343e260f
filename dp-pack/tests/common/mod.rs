//! Services amont simulés (géocodage, cadastre, WMS, vues de rue)

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::json;

/// Adresse que le géocodeur simulé ne connaît pas
pub const UNKNOWN_ADDRESS: &str = "Nulle Part 00000";

/// Réponse du registre parcellaire simulé
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CadastreReply {
    /// Parcelle AB 0123
    #[default]
    Parcel,
    /// Collection sans feature
    Empty,
    /// Feature sans section, numéro ni idu
    Unnamed,
    /// Statut d'erreur
    Status(u16),
}

#[derive(Default)]
pub struct MockState {
    pub cadastre: CadastreReply,
    pub geocode_hits: AtomicUsize,
    pub cadastre_hits: AtomicUsize,
    pub wms_hits: AtomicUsize,
    pub streetview_hits: AtomicUsize,
    /// (WIDTH, HEIGHT) de chaque GetMap reçu
    pub wms_sizes: Mutex<Vec<(u32, u32)>>,
}

impl MockState {
    pub fn wms_hits(&self) -> usize {
        self.wms_hits.load(Ordering::SeqCst)
    }
}

pub struct MockServer {
    pub base_url: String,
    pub state: Arc<MockState>,
}

/// Démarre les services simulés sur un port libre
pub async fn start(cadastre_status: u16) -> MockServer {
    let reply = match cadastre_status {
        200 => CadastreReply::Parcel,
        status => CadastreReply::Status(status),
    };
    start_with(reply).await
}

pub async fn start_with(cadastre: CadastreReply) -> MockServer {
    let state = Arc::new(MockState {
        cadastre,
        ..Default::default()
    });

    let app = Router::new()
        .route("/search", get(geocode))
        .route("/cadastre/parcelle", get(self::cadastre))
        .route("/wms-r", get(wms))
        .route("/streetview", get(streetview))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// PNG uni aux dimensions demandées
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([180, 200, 220, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

async fn geocode(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.geocode_hits.fetch_add(1, Ordering::SeqCst);
    let q = params.get("q").cloned().unwrap_or_default();
    if q == UNKNOWN_ADDRESS {
        return axum::Json(json!({ "type": "FeatureCollection", "features": [] })).into_response();
    }

    axum::Json(json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [-0.0449, 49.2317] },
            "properties": {
                "label": "14 Rue Emile Nicol 14430 Dozulé",
                "city": "Dozulé",
                "postcode": "14430",
                "citycode": "14229"
            }
        }]
    }))
    .into_response()
}

async fn cadastre(State(state): State<Arc<MockState>>) -> Response {
    state.cadastre_hits.fetch_add(1, Ordering::SeqCst);
    let properties = match state.cadastre {
        CadastreReply::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap();
            return (status, "upstream error").into_response();
        }
        CadastreReply::Empty => {
            return axum::Json(json!({ "type": "FeatureCollection", "features": [] })).into_response();
        }
        CadastreReply::Unnamed => json!({ "commune": "14229", "nom_com": "Dozulé" }),
        CadastreReply::Parcel => json!({
            "section": "AB",
            "numero": "0123",
            "feuille": 1,
            "nom_com": "Dozulé",
            "code_insee": "14229",
            "idu": "14229000AB0123"
        }),
    };

    axum::Json(json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": null,
            "properties": properties
        }]
    }))
    .into_response()
}

async fn wms(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.wms_hits.fetch_add(1, Ordering::SeqCst);
    let dim = |key: &str| params.get(key).and_then(|v| v.parse::<u32>().ok()).unwrap_or(1);
    let (width, height) = (dim("WIDTH"), dim("HEIGHT"));
    state.wms_sizes.lock().unwrap().push((width, height));
    png_response(png(width, height))
}

async fn streetview(State(state): State<Arc<MockState>>) -> Response {
    state.streetview_hits.fetch_add(1, Ordering::SeqCst);
    png_response(png(160, 120))
}
