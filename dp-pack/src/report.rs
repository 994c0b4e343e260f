//! Rapport de génération avec dégradation gracieuse
//!
//! Chaque source de données indisponible (parcelle, image, annotation) est
//! consignée ici ; le dossier reste produit mais marqué `Degraded`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global de la génération
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationStatus {
    /// Toutes les données disponibles
    Success,
    /// Dossier produit avec des emplacements réservés
    Degraded,
}

/// Donnée remplacée par un emplacement réservé
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetWarning {
    /// Élément concerné (`parcel`, `dp1-plan-1000`, ...)
    pub asset: String,
    /// Raison de l'absence
    pub message: String,
}

/// Page produite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    /// Identifiant de pièce (`DP1`, `DP7-8`, ...)
    pub id: String,
    pub title: String,
}

/// Rapport complet d'une génération
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub request_id: String,
    /// Adresse saisie
    pub address: String,
    /// Libellé normalisé du géocodage
    pub label: Option<String>,
    /// Référence cadastrale retenue
    pub parcel: Option<String>,
    pub duration_secs: f64,
    pub status: GenerationStatus,
    pub pages: Vec<PageEntry>,
    pub warnings: Vec<AssetWarning>,
    pub pdf_path: Option<PathBuf>,
}

impl GenerationReport {
    pub fn new(request_id: &str, address: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            address: address.to_string(),
            label: None,
            parcel: None,
            duration_secs: 0.0,
            status: GenerationStatus::Success,
            pages: Vec::new(),
            warnings: Vec::new(),
            pdf_path: None,
        }
    }

    /// Enregistre une page produite
    pub fn record_page(&mut self, id: &str, title: &str) {
        self.pages.push(PageEntry {
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    /// Enregistre une donnée remplacée
    pub fn record_warning(&mut self, asset: &str, message: impl Into<String>) {
        self.warnings.push(AssetWarning {
            asset: asset.to_string(),
            message: message.into(),
        });
    }

    /// Définit la durée de la génération
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.warnings.is_empty() {
            GenerationStatus::Success
        } else {
            GenerationStatus::Degraded
        };
    }

    pub fn is_degraded(&self) -> bool {
        self.status == GenerationStatus::Degraded
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("DP PACK REPORT - {}", self.request_id);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Address: {}", self.address);
        if let Some(label) = &self.label {
            println!("Geocoded: {}", label);
        }
        println!("Parcel: {}", self.parcel.as_deref().unwrap_or("-"));

        println!("\n--- PAGES ({}) ---", self.pages.len());
        for (i, page) in self.pages.iter().enumerate() {
            println!("  {:>2}. [{}] {}", i + 1, page.id, page.title);
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(20) {
                println!("  [{}] {}", w.asset, w.message);
            }
            if self.warnings.len() > 20 {
                println!("  ... and {} more", self.warnings.len() - 20);
            }
        }

        if let Some(path) = &self.pdf_path {
            println!("\nPDF: {}", path.display());
        }
        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} pages, {} warnings ({:?})",
            self.request_id,
            self.pages.len(),
            self.warnings.len(),
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = GenerationReport::new("abc123", "1 rue X");
        assert_eq!(report.status, GenerationStatus::Success);
        assert!(report.pages.is_empty());
    }

    #[test]
    fn test_finalize_success() {
        let mut report = GenerationReport::new("abc123", "1 rue X");
        report.record_page("DP1", "DP1 - PLAN DE SITUATION");
        report.finalize();
        assert_eq!(report.status, GenerationStatus::Success);
    }

    #[test]
    fn test_finalize_degraded() {
        let mut report = GenerationReport::new("abc123", "1 rue X");
        report.record_page("DP1", "DP1 - PLAN DE SITUATION");
        report.record_warning("parcel", "HTTP 500");
        report.finalize();
        assert!(report.is_degraded());
    }

    #[test]
    fn test_summary() {
        let mut report = GenerationReport::new("abc123", "1 rue X");
        report.record_page("COUVERTURE", "DECLARATION PREALABLE");
        let summary = report.summary();
        assert!(summary.contains("abc123"));
        assert!(summary.contains("1 pages"));
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = GenerationReport::new("abc123", "1 rue X");
        report.record_warning("dp6", "GOOGLE_MAPS_API_KEY manquant");
        report.finalize();
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "Degraded");
        assert_eq!(json["warnings"][0]["asset"], "dp6");
    }
}
