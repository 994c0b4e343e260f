//! Production des images du dossier
//!
//! Chaque tâche d'imagerie est indépendante : elles s'exécutent en parallèle
//! (au plus `jobs` à la fois). À l'intérieur d'une tâche l'ordre reste fixe :
//! cadrage, récupération, annotations. Une image indisponible est remplacée
//! par une image « Image indisponible » et consignée.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dpgeo::wms::{LAYER_CADASTRE, LAYER_ORTHO, LAYER_PLAN};
use dpgeo::{bbox_from_scale, GeoPoint, ImageFormat, LambertPoint, MapFrame, WmsRequest};
use futures::future::BoxFuture;
use futures::{stream, FutureExt, StreamExt};
use tracing::{debug, info, warn};

use crate::config::PackConfig;
use crate::layout::{self, frame_of, Layout};
use crate::net::HttpClient;
use crate::overlays;
use crate::report::AssetWarning;
use crate::streetview::{fetch_street_view, StreetViewRequest, STREET_VIEW_HEIGHT, STREET_VIEW_WIDTH};
use crate::wms::save_wms_image;

/// Emplacement d'image dans le dossier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetSlot {
    Dp1Plan1000,
    Dp1Ortho1000,
    Dp1Plan2000,
    Dp1Plan5000,
    Dp2Avant,
    Dp2Apres,
    Dp4Roof,
    Dp5,
    Dp6,
    Dp7,
    Dp8,
}

impl AssetSlot {
    pub const ALL: [AssetSlot; 11] = [
        Self::Dp1Plan1000,
        Self::Dp1Ortho1000,
        Self::Dp1Plan2000,
        Self::Dp1Plan5000,
        Self::Dp2Avant,
        Self::Dp2Apres,
        Self::Dp4Roof,
        Self::Dp5,
        Self::Dp6,
        Self::Dp7,
        Self::Dp8,
    ];

    /// Nom stable (fichiers, rapport)
    pub fn name(self) -> &'static str {
        match self {
            Self::Dp1Plan1000 => "dp1-plan-1000",
            Self::Dp1Ortho1000 => "dp1-ortho-1000",
            Self::Dp1Plan2000 => "dp1-plan-2000",
            Self::Dp1Plan5000 => "dp1-plan-5000",
            Self::Dp2Avant => "dp2-avant",
            Self::Dp2Apres => "dp2-apres",
            Self::Dp4Roof => "dp4-ortho-roof",
            Self::Dp5 => "dp5-ortho-panels",
            Self::Dp6 => "dp6-streetview-panels",
            Self::Dp7 => "dp7-streetview-proche",
            Self::Dp8 => "dp8-streetview-loin",
        }
    }

    /// Libellé lisible, affiché sur l'image de remplacement
    pub fn label(self) -> &'static str {
        match self {
            Self::Dp1Plan1000 => "Plan de situation 1/1000",
            Self::Dp1Ortho1000 => "Orthophoto 1/1000",
            Self::Dp1Plan2000 => "Plan de situation 1/2000",
            Self::Dp1Plan5000 => "Plan de situation 1/5000",
            Self::Dp2Avant => "Plan de masse avant",
            Self::Dp2Apres => "Plan de masse apres",
            Self::Dp4Roof => "Vue toiture",
            Self::Dp5 => "Insertion graphique",
            Self::Dp6 => "Insertion photographique",
            Self::Dp7 => "Photographie proche",
            Self::Dp8 => "Photographie lointaine",
        }
    }
}

/// Image d'un emplacement
#[derive(Debug, Clone, PartialEq)]
pub enum ImageAsset {
    /// Image réelle
    Image(PathBuf),
    /// Image de remplacement, avec la raison
    Placeholder { path: PathBuf, reason: String },
    /// Rien à afficher (même le remplacement a échoué)
    Missing { reason: String },
}

impl ImageAsset {
    /// Fichier à placer sur la page
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Image(path) | Self::Placeholder { path, .. } => Some(path),
            Self::Missing { .. } => None,
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Image(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Image(_) => None,
            Self::Placeholder { reason, .. } | Self::Missing { reason } => Some(reason),
        }
    }
}

/// Ensemble des images produites et des dégradations rencontrées
#[derive(Debug, Clone, Default)]
pub struct AssetSet {
    assets: BTreeMap<AssetSlot, ImageAsset>,
    pub warnings: Vec<AssetWarning>,
}

impl AssetSet {
    pub fn get(&self, slot: AssetSlot) -> Option<&ImageAsset> {
        self.assets.get(&slot)
    }

    pub fn insert(&mut self, slot: AssetSlot, asset: ImageAsset) {
        if let Some(reason) = asset.reason() {
            self.warnings.push(AssetWarning {
                asset: slot.name().to_string(),
                message: reason.to_string(),
            });
        }
        self.assets.insert(slot, asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Résultat d'une tâche d'imagerie
#[derive(Debug, Default)]
struct JobOutput {
    assets: Vec<(AssetSlot, ImageAsset)>,
    warnings: Vec<AssetWarning>,
}

impl JobOutput {
    fn single(slot: AssetSlot, asset: ImageAsset) -> Self {
        Self {
            assets: vec![(slot, asset)],
            warnings: Vec::new(),
        }
    }
}

/// Contexte partagé par les tâches d'une génération
pub struct AssetContext<'a> {
    pub http: &'a HttpClient,
    pub config: &'a PackConfig,
    pub out_dir: &'a Path,
    pub center: LambertPoint,
    pub location: GeoPoint,
}

/// Une carte à récupérer
#[derive(Debug, Clone, Copy)]
struct MapJob {
    layer: &'static str,
    format: ImageFormat,
    transparent: bool,
    scale: f64,
    frame: MapFrame,
}

impl MapJob {
    fn plan(scale: f64, frame: MapFrame) -> Self {
        Self {
            layer: LAYER_PLAN,
            format: ImageFormat::Png,
            transparent: false,
            scale,
            frame,
        }
    }

    fn ortho(scale: f64, frame: MapFrame) -> Self {
        Self {
            layer: LAYER_ORTHO,
            format: ImageFormat::Jpeg,
            transparent: false,
            scale,
            frame,
        }
    }

    fn cadastre(scale: f64, frame: MapFrame) -> Self {
        Self {
            layer: LAYER_CADASTRE,
            format: ImageFormat::Png,
            transparent: true,
            scale,
            frame,
        }
    }
}

/// Annotations à appliquer après récupération
#[derive(Debug, Clone, Copy)]
enum Annotate {
    NorthArrow,
    Dp1,
    Dp5,
}

impl Annotate {
    fn apply(self, base: &Path, out: &Path) -> Result<PathBuf> {
        match self {
            Self::NorthArrow => overlays::add_north_arrow(base, out),
            Self::Dp1 => overlays::add_dp1_overlays(base, out),
            Self::Dp5 => overlays::overlay_sized_on_image(base, out, overlays::dp5_overlay_specs),
        }
    }
}

/// Exécute une tâche CPU hors du runtime asynchrone
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.context("Image task panicked")?
}

/// Charge une image, compose les annotations, écrit le résultat
async fn annotate_file(base: PathBuf, out: PathBuf, annotate: Annotate) -> Result<PathBuf> {
    blocking(move || annotate.apply(&base, &out)).await
}

impl AssetContext<'_> {
    fn path(&self, stem: &str, ext: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{}", stem, ext))
    }

    /// Cadre une carte et la télécharge
    async fn fetch_map(&self, stem: &str, job: MapJob) -> Result<PathBuf> {
        let framing = bbox_from_scale(self.center, job.scale, job.frame, self.config.dpi)?;
        let request = WmsRequest {
            layer: job.layer.to_string(),
            bbox: framing.bbox,
            width_px: framing.width_px,
            height_px: framing.height_px,
            format: job.format,
            transparent: job.transparent,
            dpi: Some(self.config.dpi),
        };
        debug!(
            layer = job.layer,
            scale = job.scale,
            width = framing.width_px,
            height = framing.height_px,
            meters_per_pixel = framing.meters_per_pixel,
            "Carte cadrée"
        );

        let path = self.path(stem, job.format.extension());
        save_wms_image(self.http, &self.config.endpoints.wms, &request, &path, self.config.jobs).await
    }

    /// Taille en pixels prévue pour une carte (taille du remplacement)
    fn planned_size(&self, job: MapJob) -> (u32, u32) {
        bbox_from_scale(self.center, job.scale, job.frame, self.config.dpi)
            .map(|f| (f.width_px, f.height_px))
            .unwrap_or((1200, 800))
    }

    /// Écrit l'image de remplacement d'un emplacement
    async fn placeholder(&self, slot: AssetSlot, size: (u32, u32), reason: String) -> ImageAsset {
        warn!(asset = slot.name(), "Image unavailable, using placeholder: {}", reason);
        let path = self.path(&format!("{}-placeholder", slot.name()), "png");
        let label = slot.label();
        let written = blocking({
            let path = path.clone();
            move || overlays::write_placeholder_image(&path, size.0, size.1, label)
        })
        .await;

        match written {
            Ok(path) => ImageAsset::Placeholder { path, reason },
            Err(e) => {
                warn!(asset = slot.name(), "Failed to write placeholder: {}", e);
                ImageAsset::Missing {
                    reason: format!("{} (placeholder failed: {})", reason, e),
                }
            }
        }
    }

    /// Carte annotée, ou remplacement
    async fn annotated_map(&self, slot: AssetSlot, job: MapJob, annotate: Annotate) -> JobOutput {
        let produced: Result<PathBuf> = async {
            let base = self.fetch_map(&format!("{}-base", slot.name()), job).await?;
            annotate_file(base, self.path(slot.name(), "png"), annotate).await
        }
        .await;

        let asset = match produced {
            Ok(path) => ImageAsset::Image(path),
            Err(e) => self.placeholder(slot, self.planned_size(job), format!("{:#}", e)).await,
        };
        JobOutput::single(slot, asset)
    }

    /// Carte brute, ou remplacement
    async fn plain_map(&self, slot: AssetSlot, job: MapJob) -> JobOutput {
        let asset = match self.fetch_map(slot.name(), job).await {
            Ok(path) => ImageAsset::Image(path),
            Err(e) => self.placeholder(slot, self.planned_size(job), format!("{:#}", e)).await,
        };
        JobOutput::single(slot, asset)
    }

    /// Plans de masse DP2 : orthophoto + cadastre (55 %), puis panneaux
    async fn dp2(&self, frame: MapFrame) -> JobOutput {
        let ortho_job = MapJob::ortho(layout::SCALE_DP2, frame);
        let cadastre_job = MapJob::cadastre(layout::SCALE_DP2, frame);
        let size = self.planned_size(ortho_job);
        let mut output = JobOutput::default();

        let (ortho, cadastre) = futures::join!(
            self.fetch_map("dp2-ortho", ortho_job),
            self.fetch_map("dp2-cadastre", cadastre_job),
        );

        let ortho_path = match ortho {
            Ok(path) => path,
            Err(e) => {
                let reason = format!("{:#}", e);
                let avant = self.placeholder(AssetSlot::Dp2Avant, size, reason.clone()).await;
                let apres = self.placeholder(AssetSlot::Dp2Apres, size, reason).await;
                output.assets.push((AssetSlot::Dp2Avant, avant));
                output.assets.push((AssetSlot::Dp2Apres, apres));
                return output;
            }
        };

        let cadastre_path = match cadastre {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to fetch cadastre layer, DP2 without parcels: {:#}", e);
                output.warnings.push(AssetWarning {
                    asset: "dp2-cadastre".to_string(),
                    message: format!("{:#}", e),
                });
                None
            }
        };

        let avant_path = self.path(AssetSlot::Dp2Avant.name(), "png");
        let apres_path = self.path(AssetSlot::Dp2Apres.name(), "png");
        let composed = blocking({
            let (avant_path, apres_path) = (avant_path.clone(), apres_path.clone());
            move || {
                let mut avant = overlays::load_image(&ortho_path)?;
                if let Some(cadastre_path) = cadastre_path {
                    let cadastre = overlays::load_image(&cadastre_path)?;
                    overlays::blend_with_opacity(&mut avant, &cadastre, layout::CADASTRE_OPACITY);
                }
                let mut apres = avant.clone();
                overlays::save_image(avant, &avant_path)?;

                let specs = overlays::dp2_panel_specs(apres.width(), apres.height());
                overlays::composite_overlays(&mut apres, &specs)?;
                overlays::save_image(apres, &apres_path)?;
                Ok(())
            }
        })
        .await;

        match composed {
            Ok(()) => {
                output.assets.push((AssetSlot::Dp2Avant, ImageAsset::Image(avant_path)));
                output.assets.push((AssetSlot::Dp2Apres, ImageAsset::Image(apres_path)));
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                let avant = self.placeholder(AssetSlot::Dp2Avant, size, reason.clone()).await;
                let apres = self.placeholder(AssetSlot::Dp2Apres, size, reason).await;
                output.assets.push((AssetSlot::Dp2Avant, avant));
                output.assets.push((AssetSlot::Dp2Apres, apres));
            }
        }
        output
    }

    /// Vue de rue, annotée pour DP6
    async fn street_view(&self, slot: AssetSlot, request: StreetViewRequest, annotate: bool) -> JobOutput {
        let produced: Result<PathBuf> = async {
            let bytes = fetch_street_view(
                self.http,
                &self.config.endpoints.street_view,
                self.config.street_view_key.as_deref(),
                &request,
            )
            .await?;
            if image::guess_format(&bytes).is_err() {
                anyhow::bail!("Street View returned no image");
            }

            let raw = self.path(&format!("{}-raw", slot.name()), "jpg");
            tokio::fs::write(&raw, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", raw.display()))?;

            if !annotate {
                return Ok(raw);
            }
            let out = self.path(slot.name(), "png");
            blocking(move || overlays::overlay_sized_on_image(&raw, &out, overlays::dp6_overlay_specs)).await
        }
        .await;

        let asset = match produced {
            Ok(path) => ImageAsset::Image(path),
            Err(e) => {
                self.placeholder(slot, (STREET_VIEW_WIDTH, STREET_VIEW_HEIGHT), format!("{:#}", e))
                    .await
            }
        };
        JobOutput::single(slot, asset)
    }
}

/// Produit toutes les images du dossier
pub async fn collect_assets(ctx: &AssetContext<'_>) -> AssetSet {
    let page = Layout::new(&ctx.config.geometry);
    let (plan_rect, _) = page.dp1_pair();
    let near = frame_of(plan_rect);
    let single = frame_of(page.dp1_single());
    let dp2 = frame_of(page.full_width(layout::DP2_MAP_HEIGHT));
    let roof = frame_of(page.dp4_roof());
    let dp5 = frame_of(page.full_width(layout::DP5_MAP_HEIGHT));

    let jobs: Vec<BoxFuture<'_, JobOutput>> = vec![
        ctx.annotated_map(
            AssetSlot::Dp1Plan1000,
            MapJob::plan(layout::SCALE_DP1_NEAR, near),
            Annotate::NorthArrow,
        )
        .boxed(),
        ctx.annotated_map(
            AssetSlot::Dp1Ortho1000,
            MapJob::ortho(layout::SCALE_DP1_NEAR, near),
            Annotate::Dp1,
        )
        .boxed(),
        ctx.annotated_map(
            AssetSlot::Dp1Plan2000,
            MapJob::plan(layout::SCALE_DP1_MID, single),
            Annotate::Dp1,
        )
        .boxed(),
        ctx.annotated_map(
            AssetSlot::Dp1Plan5000,
            MapJob::plan(layout::SCALE_DP1_FAR, single),
            Annotate::Dp1,
        )
        .boxed(),
        ctx.dp2(dp2).boxed(),
        ctx.plain_map(AssetSlot::Dp4Roof, MapJob::ortho(layout::SCALE_DP4, roof))
            .boxed(),
        ctx.annotated_map(AssetSlot::Dp5, MapJob::ortho(layout::SCALE_DP5, dp5), Annotate::Dp5)
            .boxed(),
        ctx.street_view(AssetSlot::Dp6, StreetViewRequest::dp6(ctx.location), true)
            .boxed(),
        ctx.street_view(AssetSlot::Dp7, StreetViewRequest::dp7(ctx.location), false)
            .boxed(),
        ctx.street_view(AssetSlot::Dp8, StreetViewRequest::dp8(ctx.location), false)
            .boxed(),
    ];

    info!(jobs = jobs.len(), concurrency = ctx.config.jobs, "Récupération des images");
    let outputs: Vec<JobOutput> = stream::iter(jobs)
        .buffer_unordered(ctx.config.jobs.max(1))
        .collect()
        .await;

    let mut set = AssetSet::default();
    for output in outputs {
        set.warnings.extend(output.warnings);
        for (slot, asset) in output.assets {
            set.insert(slot, asset);
        }
    }
    // Ordre stable dans le rapport
    set.warnings.sort_by(|a, b| a.asset.cmp(&b.asset));

    info!(
        images = set.len(),
        degraded = set.warnings.len(),
        "Images du dossier prêtes"
    );
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names_unique() {
        let mut names: Vec<_> = AssetSlot::ALL.iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), AssetSlot::ALL.len());
    }

    #[test]
    fn test_asset_set_records_placeholders() {
        let mut set = AssetSet::default();
        set.insert(AssetSlot::Dp5, ImageAsset::Image(PathBuf::from("a.png")));
        set.insert(
            AssetSlot::Dp6,
            ImageAsset::Placeholder {
                path: PathBuf::from("b.png"),
                reason: "GOOGLE_MAPS_API_KEY manquant".into(),
            },
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.warnings.len(), 1);
        assert_eq!(set.warnings[0].asset, "dp6-streetview-panels");
        assert!(set.get(AssetSlot::Dp5).is_some_and(ImageAsset::is_real));
    }

    #[test]
    fn test_missing_has_no_path() {
        let asset = ImageAsset::Missing { reason: "x".into() };
        assert!(asset.path().is_none());
        assert_eq!(asset.reason(), Some("x"));
    }
}
