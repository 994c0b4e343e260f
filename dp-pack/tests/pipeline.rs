//! Génération complète contre des services simulés

mod common;

use std::path::Path;

use common::CadastreReply;
use dp_pack::assets::AssetSet;
use dp_pack::cadastre::get_parcel_ref;
use dp_pack::config::{DpMeta, PackConfig, PLACEHOLDER};
use dp_pack::pages::{render_dossier, DossierContent};
use dp_pack::template::{DrawOp, RecordingCanvas, Template};
use dp_pack::wms::fetch_wms_image;
use dp_pack::{build_dp_pack, DpOptions, GenerationStatus, HttpClient, RetryPolicy};
use dpgeo::wms::LAYER_ORTHO;
use dpgeo::{bbox, ImageFormat, WmsRequest};

const ADDRESS: &str = "14 Rue Emile Nicol, 14430 Dozulé";

fn options(base_url: &str, output_dir: &Path, preset: &str) -> DpOptions {
    let mut config = PackConfig::with_base_url(base_url);
    config.output_dir = output_dir.to_path_buf();
    config.dpi = 20;
    config.jobs = 4;
    config.retry = RetryPolicy::immediate(0);
    config.street_view_key = Some("test-key".to_string());
    DpOptions::new(config, DpMeta::from_preset(preset).unwrap())
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_end_to_end_dossier() {
    let server = common::start(200).await;
    let out = tempfile::tempdir().unwrap();

    let pack = build_dp_pack(ADDRESS, &options(&server.base_url, out.path(), "demo"))
        .await
        .unwrap();

    assert!(pack.pdf_path.exists());
    assert!(pack.pdf_path.starts_with(out.path()));
    let bytes = std::fs::read(&pack.pdf_path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let report = &pack.report;
    assert_eq!(report.pages.len(), 11);
    assert_eq!(report.parcel.as_deref(), Some("AB 0123"));
    assert_eq!(report.label.as_deref(), Some("14 Rue Emile Nicol 14430 Dozulé"));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.status, GenerationStatus::Success);

    // 8 cartes (DP1 x4, DP2 ortho + cadastre, DP4, DP5) et 3 vues de rue
    assert_eq!(server.state.wms_hits(), 8);
    assert_eq!(server.state.streetview_hits.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unknown_address_fails_without_output() {
    let server = common::start(200).await;
    let out = tempfile::tempdir().unwrap();

    let err = build_dp_pack(common::UNKNOWN_ADDRESS, &options(&server.base_url, out.path(), "neutral"))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("non trouvee"), "{:#}", err);
    assert_eq!(entries(out.path()), 0);
    assert_eq!(server.state.wms_hits(), 0);
}

#[tokio::test]
async fn test_cadastre_failure_degrades() {
    let server = common::start(500).await;
    let out = tempfile::tempdir().unwrap();

    let pack = build_dp_pack(ADDRESS, &options(&server.base_url, out.path(), "neutral"))
        .await
        .unwrap();

    assert!(pack.pdf_path.exists());
    assert_eq!(pack.report.status, GenerationStatus::Degraded);
    assert_eq!(pack.report.parcel, None);
    assert!(pack.report.warnings.iter().any(|w| w.asset == "parcel"));
    assert_eq!(pack.report.pages.len(), 11);
}

#[tokio::test]
async fn test_parcel_ref_is_none_without_reference() {
    let http = HttpClient::new(RetryPolicy::immediate(0)).unwrap();

    for reply in [CadastreReply::Empty, CadastreReply::Unnamed, CadastreReply::Status(404)] {
        let server = common::start_with(reply).await;
        let endpoint = format!("{}/cadastre/parcelle", server.base_url);
        let parcel = get_parcel_ref(&http, &endpoint, 49.2317, -0.0449).await;
        assert_eq!(parcel, None, "{:?}", reply);
    }

    let server = common::start_with(CadastreReply::Parcel).await;
    let endpoint = format!("{}/cadastre/parcelle", server.base_url);
    let parcel = get_parcel_ref(&http, &endpoint, 49.2317, -0.0449).await.unwrap();
    assert_eq!(parcel.reference, "AB 0123");
    assert_eq!(parcel.commune.as_deref(), Some("Dozulé"));
}

#[tokio::test]
async fn test_parcel_without_reference_degrades() {
    for reply in [CadastreReply::Empty, CadastreReply::Unnamed] {
        let server = common::start_with(reply).await;
        let out = tempfile::tempdir().unwrap();

        let pack = build_dp_pack(ADDRESS, &options(&server.base_url, out.path(), "neutral"))
            .await
            .unwrap();

        assert_eq!(pack.report.parcel, None, "{:?}", reply);
        assert_eq!(pack.report.status, GenerationStatus::Degraded, "{:?}", reply);
        let parcel: Vec<_> = pack.report.warnings.iter().filter(|w| w.asset == "parcel").collect();
        assert_eq!(parcel.len(), 1, "{:?}", reply);
        assert_eq!(pack.report.pages.len(), 11);
    }
}

#[tokio::test]
async fn test_explicit_parcel_skips_placeholder() {
    let server = common::start(500).await;
    let out = tempfile::tempdir().unwrap();
    let mut opts = options(&server.base_url, out.path(), "neutral");
    opts.meta.parcel_ref = Some("ZK 42".to_string());

    let pack = build_dp_pack(ADDRESS, &opts).await.unwrap();

    assert_eq!(pack.report.parcel.as_deref(), Some("ZK 42"));
    assert!(!pack.report.is_degraded());
}

#[tokio::test]
async fn test_missing_street_view_key_uses_placeholders() {
    let server = common::start(200).await;
    let out = tempfile::tempdir().unwrap();
    let mut opts = options(&server.base_url, out.path(), "demo");
    opts.config.street_view_key = None;

    let pack = build_dp_pack(ADDRESS, &opts).await.unwrap();

    let degraded: Vec<_> = pack.report.warnings.iter().map(|w| w.asset.as_str()).collect();
    assert_eq!(
        degraded,
        ["dp6-streetview-panels", "dp7-streetview-proche", "dp8-streetview-loin"]
    );
    assert!(pack.report.warnings.iter().all(|w| w.message.contains("GOOGLE_MAPS_API_KEY")));
    assert_eq!(server.state.streetview_hits.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(pack.output_dir.join("dp6-streetview-panels-placeholder.png").exists());
}

#[tokio::test]
async fn test_street_view_outage_uses_placeholders() {
    let server = common::start(200).await;
    let out = tempfile::tempdir().unwrap();
    let mut opts = options(&server.base_url, out.path(), "demo");
    opts.config.endpoints.street_view = format!("{}/streetview-down", server.base_url);

    let pack = build_dp_pack(ADDRESS, &opts).await.unwrap();

    assert_eq!(pack.report.status, GenerationStatus::Degraded);
    assert_eq!(pack.report.warnings.len(), 3, "{:?}", pack.report.warnings);
    assert!(pack
        .report
        .warnings
        .iter()
        .all(|w| w.asset.contains("streetview") && w.message.contains("indisponible")));
    assert_eq!(pack.report.pages.len(), 11);
}

#[tokio::test]
async fn test_oversized_image_is_tiled() {
    let server = common::start(200).await;
    let http = HttpClient::new(RetryPolicy::immediate(0)).unwrap();
    let endpoint = format!("{}/wms-r", server.base_url);

    let request = WmsRequest {
        layer: LAYER_ORTHO.to_string(),
        bbox: bbox(0.0, 0.0, 300.0, 100.0),
        width_px: 3000,
        height_px: 1000,
        format: ImageFormat::Png,
        transparent: false,
        dpi: None,
    };
    let bytes = fetch_wms_image(&http, &endpoint, &request, 4).await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (3000, 1000));
    assert_eq!(server.state.wms_hits(), 2);
    let mut sizes = server.state.wms_sizes.lock().unwrap().clone();
    sizes.sort();
    assert_eq!(sizes, vec![(952, 1000), (2048, 1000)]);

    let single = WmsRequest {
        width_px: 2048,
        height_px: 2048,
        ..request
    };
    fetch_wms_image(&http, &endpoint, &single, 4).await.unwrap();
    assert_eq!(server.state.wms_hits(), 3);
}

#[test]
fn test_footer_geometry_on_every_page() {
    let template = Template::default();
    let content = DossierContent {
        address: "14 Rue Emile Nicol 14430 Dozulé".into(),
        city: Some("Dozulé".into()),
        parcel_ref: None,
        meta: DpMeta::from_preset("neutral").unwrap().resolved(),
    };
    let mut canvas = RecordingCanvas::new();
    render_dossier(&mut canvas, &template, &content, &AssetSet::default());

    assert_eq!(canvas.pages.len(), 11);
    let footer_y = 595.28 - 18.0 - 20.0 - 6.0;
    for (index, page) in canvas.pages.iter().enumerate() {
        assert_eq!((page.width, page.height), (841.89, 595.28));
        let mut xs: Vec<f64> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect { rect, .. } | DrawOp::FillRect { rect, .. } => Some(rect),
                _ => None,
            })
            .filter(|rect| (rect.y - footer_y).abs() < 1e-9 && rect.width == 140.0 && rect.height == 20.0)
            .map(|rect| rect.x)
            .collect();
        assert_eq!(xs.len(), 3, "page {}", index);
        xs.sort_by(f64::total_cmp);
        assert!((xs[1] - xs[0] - 150.0).abs() < 1e-9, "page {}", index);
        assert!((xs[2] - xs[1] - 150.0).abs() < 1e-9, "page {}", index);
        assert!(((xs[0] + xs[2] + 140.0) / 2.0 - 841.89 / 2.0).abs() < 1e-6, "page {}", index);
        assert!(page.texts().contains(&PLACEHOLDER));
    }
}
