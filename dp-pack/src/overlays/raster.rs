//! Rastérisation SVG et entrées/sorties d'images

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use dpgeo::ImageFormat;
use image::{imageops, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};

use super::svg::placeholder_svg;
use crate::wms::encode_image;

static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// Base de polices système, chargée une seule fois
fn fontdb() -> Arc<usvg::fontdb::Database> {
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            Arc::new(db)
        })
        .clone()
}

/// Rastérise un document SVG à sa taille intrinsèque
pub fn render_svg(svg: &str) -> Result<RgbaImage> {
    let opt = usvg::Options {
        fontdb: fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &opt).context("SVG parse error")?;
    let size = tree.size().to_int_size();

    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .with_context(|| format!("Pixmap allocation failed ({}x{})", size.width(), size.height()))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // tiny-skia travaille en alpha prémultiplié
    let mut img = RgbaImage::new(size.width(), size.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(img)
}

/// Format d'écriture déduit de l'extension (`.jpg`/`.jpeg` → JPEG, sinon PNG)
pub fn format_for_path(path: &Path) -> ImageFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    }
}

/// Charge une image en RGBA, format déduit du contenu
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let decoded = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    Ok(decoded.to_rgba8())
}

/// Dimensions lues dans l'en-tête, sans décoder les pixels
pub fn image_size(path: &Path) -> Result<(u32, u32)> {
    image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .into_dimensions()
        .with_context(|| format!("Failed to read size of {}", path.display()))
}

pub fn save_image(img: RgbaImage, path: &Path) -> Result<PathBuf> {
    let bytes = encode_image(img, format_for_path(path))?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

/// Écrit une image de remplacement « Image indisponible » aux dimensions données
pub fn write_placeholder_image(path: &Path, width: u32, height: u32, label: &str) -> Result<PathBuf> {
    let img = render_svg(&placeholder_svg(width.max(1), height.max(1), label))?;
    save_image(img, path)
}

/// Superpose `top` sur `base` avec une opacité globale
///
/// `top` est redimensionné aux dimensions de `base` si nécessaire.
pub fn blend_with_opacity(base: &mut RgbaImage, top: &RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    let mut layer = if top.dimensions() == base.dimensions() {
        top.clone()
    } else {
        imageops::resize(top, base.width(), base.height(), imageops::FilterType::Triangle)
    };
    for px in layer.pixels_mut() {
        px.0[3] = (f32::from(px.0[3]) * opacity).round() as u8;
    }
    imageops::overlay(base, &layer, 0, 0);
}
