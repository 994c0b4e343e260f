//! Arguments et exécution de la commande de génération

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::{DpMeta, MetaValue, PackConfig};
use crate::generator::{build_dp_pack, DpOptions};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Adresse du projet (les mots sont joints)
    #[arg(required = true, num_args = 1..)]
    pub address: Vec<String>,

    /// Nom de l'installateur (pied de page, couverture)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Accroche de l'installateur (couverture)
    #[arg(long)]
    pub tagline: Option<String>,

    /// Logo de la couverture (PNG ou JPEG)
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Maître d'ouvrage
    #[arg(long)]
    pub owner: Option<String>,

    /// Titre du projet (couverture)
    #[arg(long)]
    pub title: Option<String>,

    /// Référence cadastrale imposée (sinon recherche par coordonnées)
    #[arg(long)]
    pub parcel: Option<String>,

    /// Puissance en kWc
    #[arg(long)]
    pub power: Option<String>,

    /// Surface des panneaux en m2
    #[arg(long)]
    pub surface: Option<String>,

    /// Type de panneaux
    #[arg(long)]
    pub panel: Option<String>,

    /// Type de toiture
    #[arg(long)]
    pub roof: Option<String>,

    #[arg(long)]
    pub orientation: Option<String>,

    #[arg(long)]
    pub slope: Option<String>,

    /// Preset de métadonnées (neutral/demo) ou chemin vers un JSON
    #[arg(long, default_value = "neutral")]
    pub preset: String,

    /// Répertoire de sortie (défaut : env DP_OUTPUT_DIR / ./dp-output)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Résolution des images (défaut : env DP_DPI / 300)
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Nombre de tâches d'imagerie simultanées (défaut : env DP_JOBS / 4)
    #[arg(long, alias = "threads")]
    pub jobs: Option<usize>,

    /// Écrire le rapport JSON à ce chemin
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn address(&self) -> String {
        self.address.join(" ")
    }

    /// Métadonnées issues des options, à appliquer sur le preset
    pub fn meta_overrides(&self) -> DpMeta {
        DpMeta {
            issuer_name: self.issuer.clone(),
            issuer_tagline: self.tagline.clone(),
            logo: self.logo.clone(),
            owner_name: self.owner.clone(),
            project_title: self.title.clone(),
            parcel_ref: self.parcel.clone(),
            power_kw: self.power.as_deref().map(MetaValue::from),
            surface_m2: self.surface.as_deref().map(MetaValue::from),
            panel_type: self.panel.clone(),
            roof_type: self.roof.clone(),
            orientation: self.orientation.clone(),
            slope: self.slope.clone(),
        }
    }

    /// Configuration d'environnement surchargée par les options
    pub fn pack_config(&self) -> Result<PackConfig> {
        let mut config = PackConfig::from_env()?;
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Exécute la génération
pub async fn cmd_generate(args: &GenerateArgs) -> Result<()> {
    let address = args.address();
    let config = args.pack_config()?;
    let meta = DpMeta::resolve(&args.preset)
        .with_context(|| format!("Invalid preset '{}'", args.preset))?
        .merge(args.meta_overrides());

    info!(address = %address, preset = %args.preset, dpi = config.dpi, jobs = config.jobs, "Démarrage");
    let pack = build_dp_pack(&address, &DpOptions::new(config, meta)).await?;

    if let Some(path) = &args.report {
        pack.report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), "Rapport enregistré");
    }

    pack.report.display();
    println!("PDF: {}", pack.pdf_path.display());
    println!("Output directory: {}", pack.output_dir.display());
    Ok(())
}
