//! Métadonnées du projet (émetteur, maître d'ouvrage, caractéristiques techniques)

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Valeur affichée quand un champ n'est pas fourni
pub const PLACEHOLDER: &str = "Non renseigne";

/// Valeur libre : nombre (unité ajoutée à l'affichage) ou texte
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Text(String),
}

impl MetaValue {
    /// Texte affiché ; les nombres reçoivent l'unité
    pub fn display_with_unit(&self, unit: &str) -> String {
        match self {
            Self::Number(n) => format!("{} {}", n, unit),
            Self::Text(s) => s.clone(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(s.to_string()),
        }
    }
}

/// Métadonnées partielles, chargées d'un preset ou d'un fichier JSON
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DpMeta {
    pub issuer_name: Option<String>,
    /// Accroche affichée sous le nom de l'installateur
    pub issuer_tagline: Option<String>,
    /// Logo de la page de garde (PNG ou JPEG)
    pub logo: Option<PathBuf>,
    pub owner_name: Option<String>,
    pub project_title: Option<String>,
    /// Référence cadastrale imposée (prioritaire sur la recherche)
    pub parcel_ref: Option<String>,
    pub power_kw: Option<MetaValue>,
    pub surface_m2: Option<MetaValue>,
    pub panel_type: Option<String>,
    pub roof_type: Option<String>,
    pub orientation: Option<String>,
    pub slope: Option<String>,
}

fn pick<T>(over: Option<T>, base: Option<T>, blank: impl Fn(&T) -> bool) -> Option<T> {
    match over {
        Some(v) if !blank(&v) => Some(v),
        _ => base,
    }
}

fn blank_str(s: &String) -> bool {
    s.trim().is_empty()
}

fn text_or_placeholder(v: &Option<String>) -> String {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

impl DpMeta {
    /// Charge depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read meta file: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse meta JSON")
    }

    /// Charge un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "neutral" => Self::load_embedded(include_str!("presets/neutral.json")),
            "demo" => Self::load_embedded(include_str!("presets/demo.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: neutral, demo", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded meta")
    }

    /// Nom de preset, ou chemin d'un fichier JSON
    pub fn resolve(preset_or_path: &str) -> Result<Self> {
        match preset_or_path {
            "neutral" | "demo" => Self::from_preset(preset_or_path),
            path => Self::load(Path::new(path)),
        }
    }

    /// Applique des surcharges : tout champ renseigné dans `overrides` l'emporte
    pub fn merge(self, overrides: DpMeta) -> Self {
        Self {
            issuer_name: pick(overrides.issuer_name, self.issuer_name, blank_str),
            issuer_tagline: pick(overrides.issuer_tagline, self.issuer_tagline, blank_str),
            logo: pick(overrides.logo, self.logo, |p| p.as_os_str().is_empty()),
            owner_name: pick(overrides.owner_name, self.owner_name, blank_str),
            project_title: pick(overrides.project_title, self.project_title, blank_str),
            parcel_ref: pick(overrides.parcel_ref, self.parcel_ref, blank_str),
            power_kw: pick(overrides.power_kw, self.power_kw, MetaValue::is_blank),
            surface_m2: pick(overrides.surface_m2, self.surface_m2, MetaValue::is_blank),
            panel_type: pick(overrides.panel_type, self.panel_type, blank_str),
            roof_type: pick(overrides.roof_type, self.roof_type, blank_str),
            orientation: pick(overrides.orientation, self.orientation, blank_str),
            slope: pick(overrides.slope, self.slope, blank_str),
        }
    }

    /// Valeurs prêtes à l'affichage, champs absents remplacés par `PLACEHOLDER`
    pub fn resolved(&self) -> ResolvedMeta {
        let present = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let with_unit = |v: &Option<MetaValue>, unit: &str| match v {
            Some(value) if !value.is_blank() => value.display_with_unit(unit),
            _ => PLACEHOLDER.to_string(),
        };

        ResolvedMeta {
            issuer_name: text_or_placeholder(&self.issuer_name),
            issuer_tagline: present(&self.issuer_tagline),
            logo: self.logo.clone().filter(|p| !p.as_os_str().is_empty()),
            owner_name: present(&self.owner_name),
            project_title: present(&self.project_title)
                .unwrap_or_else(|| "Installation photovoltaique".to_string()),
            parcel_ref: present(&self.parcel_ref),
            power: with_unit(&self.power_kw, "kWc"),
            surface: with_unit(&self.surface_m2, "m2"),
            panel_type: text_or_placeholder(&self.panel_type),
            roof_type: text_or_placeholder(&self.roof_type),
            orientation: text_or_placeholder(&self.orientation),
            slope: text_or_placeholder(&self.slope),
        }
    }
}

/// Métadonnées complètes utilisées par les pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMeta {
    pub issuer_name: String,
    pub issuer_tagline: Option<String>,
    pub logo: Option<PathBuf>,
    pub owner_name: Option<String>,
    pub project_title: String,
    pub parcel_ref: Option<String>,
    pub power: String,
    pub surface: String,
    pub panel_type: String,
    pub roof_type: String,
    pub orientation: String,
    pub slope: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_parse() {
        for preset in ["neutral", "demo"] {
            assert!(DpMeta::from_preset(preset).is_ok(), "preset {} invalid", preset);
        }
        assert!(DpMeta::from_preset("unknown").is_err());
    }

    #[test]
    fn test_demo_values() {
        let meta = DpMeta::from_preset("demo").unwrap().resolved();
        assert_eq!(meta.issuer_name, "QUALIWATT");
        assert_eq!(meta.power, "9 kWc");
        assert_eq!(meta.surface, "40 m2");
        assert_eq!(meta.slope, "30 degres");
    }

    #[test]
    fn test_neutral_has_placeholders() {
        let meta = DpMeta::from_preset("neutral").unwrap().resolved();
        assert_eq!(meta.power, PLACEHOLDER);
        assert_eq!(meta.orientation, PLACEHOLDER);
        assert_eq!(meta.owner_name, None);
        assert_eq!(meta.parcel_ref, None);
        assert_eq!(meta.issuer_tagline, None);
        assert_eq!(meta.logo, None);
    }

    #[test]
    fn test_merge_overrides() {
        let base = DpMeta::from_preset("demo").unwrap();
        let overrides = DpMeta {
            power_kw: Some(MetaValue::from("6")),
            orientation: Some("Ouest".into()),
            roof_type: Some("  ".into()),
            ..Default::default()
        };
        let meta = base.merge(overrides).resolved();
        assert_eq!(meta.power, "6 kWc");
        assert_eq!(meta.orientation, "Ouest");
        assert_eq!(meta.roof_type, "Tuiles");
    }

    #[test]
    fn test_meta_value_text() {
        assert_eq!(MetaValue::from("6,5 kWc").display_with_unit("kWc"), "6,5 kWc");
        assert_eq!(MetaValue::from("4.5").display_with_unit("m2"), "4.5 m2");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(
            &path,
            r#"{"issuer_name": "ACME", "issuer_tagline": "Solaire depuis 2009", "logo": "acme.png", "power_kw": "3 kWc"}"#,
        )
        .unwrap();
        let meta = DpMeta::resolve(path.to_str().unwrap()).unwrap().resolved();
        assert_eq!(meta.issuer_name, "ACME");
        assert_eq!(meta.issuer_tagline.as_deref(), Some("Solaire depuis 2009"));
        assert_eq!(meta.logo, Some(PathBuf::from("acme.png")));
        assert_eq!(meta.power, "3 kWc");
    }
}
