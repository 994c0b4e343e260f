//! Types d'erreurs pour le crate dpgeo

use thiserror::Error;

/// Erreurs pouvant survenir lors de la préparation des géodonnées
#[derive(Debug, Error)]
pub enum DpGeoError {
    /// Le service de géocodage n'a retourné aucun résultat
    #[error("Adresse non trouvee: {0}")]
    AddressNotFound(String),

    /// Réponse d'un service amont illisible ou incomplète
    #[error("Invalid response from {source_name}: {reason}")]
    InvalidResponse { source_name: String, reason: String },

    /// Coordonnée non finie ou hors domaine
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Cadre de carte ou requête de taille invalide
    #[error("Invalid map frame: {0}")]
    InvalidFrame(String),

    /// Erreur de désérialisation JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DpGeoError {
    /// Crée une erreur de réponse invalide avec contexte
    pub fn invalid_response(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Indique si l'erreur signifie « adresse introuvable »
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AddressNotFound(_))
    }
}
