//! Configuration de la génération

pub mod meta;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

pub use meta::{DpMeta, MetaValue, ResolvedMeta, PLACEHOLDER};

use crate::net::RetryPolicy;
use crate::template::PageGeometry;

pub const DEFAULT_GEOCODE_URL: &str = "https://api-adresse.data.gouv.fr/search/";
pub const DEFAULT_CADASTRE_URL: &str = "https://apicarto.ign.fr/api/cadastre/parcelle";
pub const DEFAULT_WMS_URL: &str = "https://data.geopf.fr/wms-r";
pub const DEFAULT_STREETVIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

/// Points d'accès des services amont
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoints {
    pub geocode: String,
    pub cadastre: String,
    pub wms: String,
    pub street_view: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: DEFAULT_GEOCODE_URL.to_string(),
            cadastre: DEFAULT_CADASTRE_URL.to_string(),
            wms: DEFAULT_WMS_URL.to_string(),
            street_view: DEFAULT_STREETVIEW_URL.to_string(),
        }
    }
}

/// Configuration complète d'une génération
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub endpoints: Endpoints,
    /// Clé Street View ; sans clé, les vues de rue sont remplacées
    pub street_view_key: Option<String>,
    /// Résolution des images de carte
    pub dpi: u32,
    /// Nombre de tâches d'imagerie simultanées
    pub jobs: usize,
    /// Répertoire racine des sorties
    pub output_dir: PathBuf,
    pub retry: RetryPolicy,
    pub geometry: PageGeometry,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            street_view_key: None,
            dpi: 300,
            jobs: 4,
            output_dir: PathBuf::from("./dp-output"),
            retry: RetryPolicy::default(),
            geometry: PageGeometry::default(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_string(key)
        .map(|v| v.trim().parse::<T>().with_context(|| format!("Invalid {}: {}", key, v)))
        .transpose()
}

impl PackConfig {
    /// Lit la configuration depuis l'environnement (`.env` chargé au préalable)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = env_string("DP_GEOCODE_URL") {
            config.endpoints.geocode = v;
        }
        if let Some(v) = env_string("CADASTRE_API_URL") {
            config.endpoints.cadastre = v;
        }
        if let Some(v) = env_string("DP_WMS_URL") {
            config.endpoints.wms = v;
        }
        if let Some(v) = env_string("DP_STREETVIEW_URL") {
            config.endpoints.street_view = v;
        }
        config.street_view_key = env_string("GOOGLE_MAPS_API_KEY");

        if let Some(v) = env_parse::<u32>("DP_DPI")? {
            config.dpi = v;
        }
        if let Some(v) = env_parse::<usize>("DP_JOBS")? {
            config.jobs = v;
        }
        if let Some(v) = env_string("DP_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }

        if let Some(v) = env_parse::<u32>("DP_RETRIES")? {
            config.retry.retries = v;
        }
        if let Some(v) = env_parse::<u64>("DP_TIMEOUT_MS")? {
            config.retry.timeout = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("DP_BACKOFF_MS")? {
            config.retry.backoff = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("DP_JITTER_MS")? {
            config.retry.jitter = Duration::from_millis(v);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > 1200 {
            anyhow::bail!("DPI must be between 1 and 1200, got {}", self.dpi);
        }
        if self.jobs == 0 {
            anyhow::bail!("Jobs must be at least 1");
        }
        Ok(())
    }

    /// Raccourci : tous les services sous une même URL de base (tests, maquettes)
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            endpoints: Endpoints {
                geocode: format!("{}/search", base),
                cadastre: format!("{}/cadastre/parcelle", base),
                wms: format!("{}/wms-r", base),
                street_view: format!("{}/streetview", base),
            },
            ..Self::default()
        }
    }
}
