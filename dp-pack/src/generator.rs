//! Assemblage du dossier
//!
//! Géocodage (seule étape bloquante), parcelle, projection, images en
//! parallèle, puis rendu des onze pages dans un PDF unique.

use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use dpgeo::to_lambert93;
use tracing::{info, warn};

use crate::assets::{collect_assets, AssetContext, AssetSet};
use crate::cadastre::resolve_parcel;
use crate::config::{DpMeta, PackConfig};
use crate::geocode::geocode_address;
use crate::lookup::Lookup;
use crate::net::HttpClient;
use crate::pages::{render_dossier, DossierContent, RenderOutcome};
use crate::report::GenerationReport;
use crate::template::{PdfCanvas, Template};

/// Nom du fichier PDF dans le répertoire de sortie
pub const PDF_FILE_NAME: &str = "dp-dossier.pdf";

/// Paramètres d'une génération
#[derive(Debug, Clone, Default)]
pub struct DpOptions {
    pub config: PackConfig,
    pub meta: DpMeta,
}

impl DpOptions {
    pub fn new(config: PackConfig, meta: DpMeta) -> Self {
        Self { config, meta }
    }
}

/// Dossier produit
#[derive(Debug, Clone)]
pub struct DpPack {
    pub pdf_path: PathBuf,
    /// Répertoire propre à cette génération (images intermédiaires, PDF)
    pub output_dir: PathBuf,
    pub report: GenerationReport,
}

/// Identifiant de requête : préfixe hexadécimal du BLAKE3 de l'adresse et de l'horodatage
pub fn request_id(address: &str, timestamp_ms: u128) -> String {
    let digest = blake3::hash(format!("{}|{}", address, timestamp_ms).as_bytes());
    hex::encode(&digest.as_bytes()[..8])
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Génère le dossier complet et retourne le chemin du PDF avec le rapport
pub async fn build_dp_pack(address: &str, options: &DpOptions) -> Result<DpPack> {
    let start = Instant::now();
    let config = &options.config;
    config.validate()?;

    let http = HttpClient::new(config.retry.clone()).context("Failed to build HTTP client")?;

    // Aucun fichier n'est écrit si l'adresse est introuvable
    let geocoded = geocode_address(&http, &config.endpoints.geocode, address).await?;

    let id = request_id(address, now_ms());
    let output_dir = config.output_dir.join(&id);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    info!(request_id = %id, output = %output_dir.display(), "Génération du dossier");

    let mut report = GenerationReport::new(&id, address);
    report.label = Some(geocoded.label.clone());

    let location = geocoded.point();
    let meta = options.meta.resolved();
    let parcel = resolve_parcel(&http, &config.endpoints.cadastre, location).await;
    let parcel_ref = match (&meta.parcel_ref, &parcel) {
        (Some(explicit), _) => Some(explicit.clone()),
        (None, Lookup::Found(info)) if !info.reference.is_empty() => Some(info.reference.clone()),
        (None, _) => None,
    };
    if parcel_ref.is_none() {
        let reason = parcel.reason().unwrap_or("référence cadastrale vide");
        warn!("Parcel unavailable, using placeholder: {}", reason);
        report.record_warning("parcel", reason);
    }
    report.parcel = parcel_ref.clone();

    let center = to_lambert93(location).context("Failed to project coordinates")?;
    let ctx = AssetContext {
        http: &http,
        config,
        out_dir: &output_dir,
        center,
        location,
    };
    let assets = collect_assets(&ctx).await;
    report.warnings.extend(assets.warnings.iter().cloned());

    let content = DossierContent {
        address: geocoded.label.clone(),
        city: geocoded.city.clone(),
        parcel_ref,
        meta,
    };
    let pdf_path = output_dir.join(PDF_FILE_NAME);
    let outcome = render_pdf(
        Template::new(config.geometry.clone()),
        content,
        assets,
        pdf_path.clone(),
    )
    .await?;

    for page in &outcome.pages {
        report.record_page(&page.id, &page.title);
    }
    report.warnings.extend(outcome.warnings);
    report.pdf_path = Some(pdf_path.clone());
    report.set_duration(start.elapsed());
    report.finalize();
    info!("{}", report.summary());

    Ok(DpPack {
        pdf_path,
        output_dir,
        report,
    })
}

/// Génère le dossier et retourne le chemin du PDF
pub async fn generate_dp_pack(address: &str, options: &DpOptions) -> Result<PathBuf> {
    build_dp_pack(address, options).await.map(|pack| pack.pdf_path)
}

/// Rendu et écriture du PDF sur un thread bloquant
async fn render_pdf(
    template: Template,
    content: DossierContent,
    assets: AssetSet,
    pdf_path: PathBuf,
) -> Result<RenderOutcome> {
    tokio::task::spawn_blocking(move || write_pdf(&template, &content, &assets, &pdf_path))
        .await
        .context("PDF task panicked")?
}

/// Dessine les pages dans un document PDF et l'enregistre
pub fn write_pdf(
    template: &Template,
    content: &DossierContent,
    assets: &AssetSet,
    pdf_path: &Path,
) -> Result<RenderOutcome> {
    let mut canvas = PdfCanvas::new(&content.meta.project_title)?;
    let outcome = render_dossier(&mut canvas, template, content, assets);
    let pages = canvas.page_count();
    canvas
        .save(pdf_path)
        .with_context(|| format!("Failed to write {}", pdf_path.display()))?;
    info!(path = %pdf_path.display(), pages, "PDF enregistré");
    Ok(outcome)
}
