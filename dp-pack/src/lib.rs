//! # dp-pack
//!
//! Génération du dossier de Déclaration Préalable (DP) d'une installation
//! photovoltaïque à partir d'une adresse.
//!
//! ## Features
//!
//! - Géocodage et recherche de la parcelle cadastrale
//! - Plans et orthophotos IGN (WMS) à échelle fixe, découpés en tuiles au besoin
//! - Annotations SVG (repère, flèche nord, panneaux, légendes)
//! - Mise en page A4 paysage sur un gabarit fixe, onze pages en PDF
//! - Appels réseau avec reprise (délai exponentiel, gigue)
//! - Dégradation sans échec : parcelle ou image manquante remplacée et signalée
//!
//! ## Usage CLI
//!
//! ```bash
//! dp-pack "14 Rue Emile Nicol, 14430 Dozulé"
//! dp-pack --preset demo --power 6 --orientation Ouest 1 rue de la Paix Paris
//! dp-pack --output-dir ./out --dpi 150 --report ./out/report.json "..."
//! ```

pub mod assets;
pub mod cadastre;
pub mod cli;
pub mod config;
pub mod generator;
pub mod geocode;
pub mod layout;
pub mod lookup;
pub mod net;
pub mod overlays;
pub mod pages;
pub mod report;
pub mod streetview;
pub mod template;
pub mod wms;

pub use config::{DpMeta, PackConfig};
pub use generator::{build_dp_pack, generate_dp_pack, DpOptions, DpPack};
pub use lookup::Lookup;
pub use net::{FetchError, HttpClient, RetryPolicy};
pub use report::{GenerationReport, GenerationStatus};
