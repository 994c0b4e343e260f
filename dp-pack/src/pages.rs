//! Rendu des pages du dossier
//!
//! Onze pages dans un ordre fixe. Chaque page est construite uniquement avec
//! les primitives de `Template` ; la surface de dessin est abstraite, ce qui
//! permet de vérifier la mise en page sans produire de PDF.

use std::path::Path;

use tracing::warn;

use crate::assets::{AssetSet, AssetSlot};
use crate::config::{ResolvedMeta, PLACEHOLDER};
use crate::layout::{self, Layout};
use crate::overlays::image_size;
use crate::report::{AssetWarning, PageEntry};
use crate::template::{Align, Canvas, FooterTriptych, KeyValueRow, PageRect, Template};

/// Titre de la page de garde
pub const COVER_TITLE: &str = "DECLARATION PREALABLE";

/// Cadre maximal du logo de couverture
pub const LOGO_MAX_WIDTH: f64 = 140.0;
pub const LOGO_MAX_HEIGHT: f64 = 60.0;

/// Pièces listées au sommaire
pub const SOMMAIRE: [&str; 11] = [
    "DP1 - Plan de situation (1/1000)",
    "DP1 - Plan de situation (1/2000)",
    "DP1 - Plan de situation (1/5000)",
    "DP2 - Plan de masse (Avant)",
    "DP2 - Plan de masse (Apres)",
    "DP4 - Fiche technique",
    "DP5 - Insertion graphique",
    "DP6 - Insertion photographique",
    "DP7 - Photographie proche",
    "DP8 - Photographie lointaine",
    "DP11 - Notice descriptive",
];

/// Pages du dossier, dans l'ordre
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Cover,
    Dp1Near,
    Dp1Mid,
    Dp1Far,
    Dp2Avant,
    Dp2Apres,
    Dp4,
    Dp5,
    Dp6,
    Dp7Dp8,
    Dp11,
}

impl PageKind {
    pub const ALL: [PageKind; 11] = [
        Self::Cover,
        Self::Dp1Near,
        Self::Dp1Mid,
        Self::Dp1Far,
        Self::Dp2Avant,
        Self::Dp2Apres,
        Self::Dp4,
        Self::Dp5,
        Self::Dp6,
        Self::Dp7Dp8,
        Self::Dp11,
    ];

    /// Identifiant de pièce (case droite du pied de page)
    pub fn id(self) -> &'static str {
        match self {
            Self::Cover => "COUVERTURE",
            Self::Dp1Near | Self::Dp1Mid | Self::Dp1Far => "DP1",
            Self::Dp2Avant | Self::Dp2Apres => "DP2",
            Self::Dp4 => "DP4",
            Self::Dp5 => "DP5",
            Self::Dp6 => "DP6",
            Self::Dp7Dp8 => "DP7-8",
            Self::Dp11 => "DP11",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Cover => COVER_TITLE,
            Self::Dp1Near | Self::Dp1Mid | Self::Dp1Far => "DP1 - PLAN DE SITUATION",
            Self::Dp2Avant => "DP2 - PLAN DE MASSE AVANT",
            Self::Dp2Apres => "DP2 - PLAN DE MASSE APRES",
            Self::Dp4 => "DP4 - FICHE TECHNIQUE",
            Self::Dp5 => "DP5 - INSERTION GRAPHIQUE",
            Self::Dp6 => "DP6 - INSERTION PHOTOGRAPHIQUE",
            Self::Dp7Dp8 => "DP7/DP8 - PHOTOGRAPHIES",
            Self::Dp11 => "DP11 - NOTICE DESCRIPTIVE",
        }
    }

    /// Case centrale du pied de page
    pub fn footer_center(self) -> &'static str {
        match self {
            Self::Cover => "Dossier DP",
            Self::Dp1Near => "Echelle 1/1000",
            Self::Dp1Mid => "Echelle 1/2000",
            Self::Dp1Far => "Echelle 1/5000",
            Self::Dp2Avant | Self::Dp2Apres => "Echelle 1/250",
            Self::Dp4 => "Echelle 1/200",
            Self::Dp5 => "Echelle 1/500",
            Self::Dp6 => "Vue terrain",
            Self::Dp7Dp8 => "Vues terrain",
            Self::Dp11 => "Notice",
        }
    }
}

/// Données textuelles du dossier
#[derive(Debug, Clone)]
pub struct DossierContent {
    /// Adresse normalisée retournée par le géocodeur
    pub address: String,
    pub city: Option<String>,
    /// Référence cadastrale retenue (métadonnées, sinon cadastre)
    pub parcel_ref: Option<String>,
    pub meta: ResolvedMeta,
}

impl DossierContent {
    pub fn parcel_display(&self) -> &str {
        self.parcel_ref.as_deref().unwrap_or(PLACEHOLDER)
    }

    /// Texte de la notice descriptive
    pub fn notice_text(&self) -> String {
        let city = self.city.as_deref().unwrap_or("VILLE");
        [
            "ETAT DES LIEUX".to_string(),
            String::new(),
            format!("Le terrain est situe dans la ville de {}.", city),
            format!(
                "Il presente une parcelle de reference cadastrale {}.",
                self.parcel_display()
            ),
            format!(
                "La toiture du bati existant est adaptee pour une installation orientee {}.",
                self.meta.orientation.to_uppercase()
            ),
            String::new(),
            "PROJET".to_string(),
            String::new(),
            "Installation de panneaux photovoltaiques noirs mats en surimposition a la toiture.".to_string(),
            "Les panneaux suivent la pente de la toiture sans la modifier.".to_string(),
            "Les couloirs techniques et les passages sont maintenus.".to_string(),
            String::new(),
            "AUTRES".to_string(),
            String::new(),
            "Aucun arbre ne sera abattu.".to_string(),
        ]
        .join("\n")
    }

    /// Lignes du tableau DP4
    pub fn technical_rows(&self) -> Vec<KeyValueRow> {
        vec![
            KeyValueRow::new("Adresse", &self.address),
            KeyValueRow::new("Parcelle", self.parcel_display()),
            KeyValueRow::new("Puissance", &self.meta.power),
            KeyValueRow::new("Surface panneaux", &self.meta.surface),
            KeyValueRow::new("Type panneaux", &self.meta.panel_type),
            KeyValueRow::new("Type toiture", &self.meta.roof_type),
            KeyValueRow::new("Orientation", &self.meta.orientation),
            KeyValueRow::new("Pente", &self.meta.slope),
        ]
    }
}

/// Résultat du rendu
#[derive(Debug, Clone, Default)]
pub struct RenderOutcome {
    pub pages: Vec<PageEntry>,
    /// Images non intégrées au document
    pub warnings: Vec<AssetWarning>,
}

struct PageRenderer<'a, C: Canvas + ?Sized> {
    canvas: &'a mut C,
    template: &'a Template,
    layout: Layout,
    content: &'a DossierContent,
    assets: &'a AssetSet,
    outcome: RenderOutcome,
}

impl<C: Canvas + ?Sized> PageRenderer<'_, C> {
    /// Ouvre une page avec cadre, titre et pied de page
    fn open(&mut self, kind: PageKind) {
        let t = self.template;
        t.begin_page(self.canvas);
        t.draw_frame(self.canvas);
        t.draw_top_title(self.canvas, kind.title());
        t.draw_footer_triptych(
            self.canvas,
            &FooterTriptych::new(&self.content.meta.issuer_name, kind.footer_center(), kind.id()),
        );
        self.outcome.pages.push(PageEntry {
            id: kind.id().to_string(),
            title: kind.title().to_string(),
        });
    }

    /// Image d'un emplacement, ou cadre vide
    fn image(&mut self, slot: AssetSlot, rect: PageRect) {
        let Some(path) = self.assets.get(slot).and_then(|a| a.path()) else {
            self.template.draw_empty_box(self.canvas, rect);
            return;
        };
        if let Err(e) = self.template.draw_image_box(self.canvas, path, rect) {
            warn!(asset = slot.name(), "Failed to embed image: {:#}", e);
            self.outcome.warnings.push(AssetWarning {
                asset: slot.name().to_string(),
                message: format!("{:#}", e),
            });
        }
    }

    /// Logo ajusté dans son cadre, centré verticalement ; un logo illisible
    /// est signalé et omis
    fn logo(&mut self, path: &Path, x: f64, y: f64) {
        let placed = image_size(path).and_then(|(w, h)| {
            let (w, h) = (f64::from(w.max(1)), f64::from(h.max(1)));
            let scale = (LOGO_MAX_WIDTH / w).min(LOGO_MAX_HEIGHT / h);
            let rect = PageRect::new(x, y + (LOGO_MAX_HEIGHT - h * scale) / 2.0, w * scale, h * scale);
            self.canvas.image(path, rect)
        });
        if let Err(e) = placed {
            warn!(logo = %path.display(), "Failed to embed logo: {:#}", e);
            self.outcome.warnings.push(AssetWarning {
                asset: "logo".to_string(),
                message: format!("{:#}", e),
            });
        }
    }

    fn cover(&mut self) {
        self.open(PageKind::Cover);
        let t = self.template;
        let g = &t.geometry;
        let content = self.content;
        let meta = &content.meta;
        let top = g.content_top();

        if let Some(logo) = &meta.logo {
            self.logo(logo, g.content_left(), g.margin + 28.0);
        }

        t.draw_text_block(self.canvas, &meta.project_title, 0.0, top + 10.0, g.width, t.bold(18.0), Align::Center);
        t.draw_text_block(self.canvas, &self.content.address, 0.0, top + 45.0, g.width, t.body(11.0), Align::Center);

        let mut lines = Vec::new();
        if meta.issuer_name != PLACEHOLDER {
            lines.push(format!("Installateur : {}", meta.issuer_name));
            if let Some(tagline) = &meta.issuer_tagline {
                lines.push(tagline.clone());
            }
        }
        if let Some(owner) = &meta.owner_name {
            lines.push(format!("Maitre d'ouvrage : {}", owner));
        }
        if !lines.is_empty() {
            t.draw_text_block(self.canvas, &lines.join("\n"), 0.0, top + 65.0, g.width, t.body(10.0), Align::Center);
        }

        t.draw_rule(self.canvas, g.content_left() + 40.0, g.content_right() - 40.0, top + 90.0);

        let left = g.content_left();
        let width = g.content_width();
        t.draw_text_block(self.canvas, "Sommaire", left, top + 110.0, width, t.bold(12.0), Align::Left);
        for (i, item) in SOMMAIRE.iter().enumerate() {
            let y = top + 135.0 + i as f64 * 18.0;
            t.draw_text_block(self.canvas, &format!("{}. {}", i + 1, item), left, y, width, t.body(10.0), Align::Left);
        }
    }

    fn dp1_pair(&mut self) {
        self.open(PageKind::Dp1Near);
        let (plan, ortho) = self.layout.dp1_pair();
        self.template.draw_label_box(self.canvas, "Plan", plan.x, plan.y - 22.0, plan.width);
        self.template.draw_label_box(self.canvas, "Orthophoto", ortho.x, ortho.y - 22.0, ortho.width);
        self.image(AssetSlot::Dp1Plan1000, plan);
        self.image(AssetSlot::Dp1Ortho1000, ortho);
    }

    fn dp1_single(&mut self, kind: PageKind, slot: AssetSlot) {
        self.open(kind);
        let rect = self.layout.dp1_single();
        self.image(slot, rect);
    }

    fn dp2(&mut self, kind: PageKind, slot: AssetSlot) {
        self.open(kind);
        let rect = self.layout.full_width(layout::DP2_MAP_HEIGHT);
        self.image(slot, rect);
        let x = rect.x + 10.0;
        self.template.draw_label_box(self.canvas, "Parcelle", x, rect.y + 12.0, 100.0);
        self.template.draw_label_box(self.canvas, "Implantation", x, rect.y + 38.0, 120.0);
    }

    fn dp4(&mut self) {
        self.open(PageKind::Dp4);
        let t = self.template;
        let (x, y) = self.layout.dp4_table();
        t.draw_text_block(self.canvas, "Caracteristiques du projet", x, y - 18.0, layout::DP4_TABLE_WIDTH, t.body(10.0), Align::Left);
        t.draw_key_value_table(self.canvas, x, y, layout::DP4_TABLE_WIDTH, &self.content.technical_rows());

        let roof = self.layout.dp4_roof();
        t.draw_label_box(self.canvas, "Vue toiture", roof.x, roof.y - 22.0, roof.width);
        self.image(AssetSlot::Dp4Roof, roof);
    }

    fn full_image(&mut self, kind: PageKind, slot: AssetSlot, height: f64) {
        self.open(kind);
        let rect = self.layout.full_width(height);
        self.image(slot, rect);
    }

    fn dp7_dp8(&mut self) {
        self.open(PageKind::Dp7Dp8);
        let (near, far) = self.layout.dp7_dp8();
        self.template.draw_label_box(self.canvas, "DP7 - Vue de près", near.x, near.y - 18.0, near.width);
        self.image(AssetSlot::Dp7, near);
        self.template.draw_label_box(self.canvas, "DP8 - Vue de loin", far.x, far.y - 18.0, far.width);
        self.image(AssetSlot::Dp8, far);
    }

    fn dp11(&mut self) {
        self.open(PageKind::Dp11);
        let t = self.template;
        let g = &t.geometry;
        t.draw_text_block(
            self.canvas,
            &self.content.notice_text(),
            g.content_left(),
            g.content_top() + 10.0,
            g.content_width(),
            t.body(10.5),
            Align::Left,
        );
    }
}

/// Dessine les onze pages du dossier sur la surface
pub fn render_dossier<C: Canvas + ?Sized>(
    canvas: &mut C,
    template: &Template,
    content: &DossierContent,
    assets: &AssetSet,
) -> RenderOutcome {
    let mut r = PageRenderer {
        canvas,
        template,
        layout: Layout::new(&template.geometry),
        content,
        assets,
        outcome: RenderOutcome::default(),
    };

    r.cover();
    r.dp1_pair();
    r.dp1_single(PageKind::Dp1Mid, AssetSlot::Dp1Plan2000);
    r.dp1_single(PageKind::Dp1Far, AssetSlot::Dp1Plan5000);
    r.dp2(PageKind::Dp2Avant, AssetSlot::Dp2Avant);
    r.dp2(PageKind::Dp2Apres, AssetSlot::Dp2Apres);
    r.dp4();
    r.full_image(PageKind::Dp5, AssetSlot::Dp5, layout::DP5_MAP_HEIGHT);
    r.full_image(PageKind::Dp6, AssetSlot::Dp6, layout::DP6_MAP_HEIGHT);
    r.dp7_dp8();
    r.dp11();

    r.outcome
}
