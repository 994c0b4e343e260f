//! Récupération des images WMS, avec découpage et assemblage en tuiles

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use dpgeo::tiling::fits_single_request;
use dpgeo::wms::get_map_params;
use dpgeo::{partition, ImageFormat, TileSpec, WmsRequest, MAX_TILE_SIZE};
use futures::{stream, StreamExt, TryStreamExt};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::net::HttpClient;

/// Qualité JPEG des orthophotographies
pub const JPEG_QUALITY: u8 = 92;

/// Récupère l'image d'une requête GetMap
///
/// Une seule requête si l'image tient dans une tuile ; sinon la grille de
/// tuiles est téléchargée (au plus `jobs` en parallèle) puis assemblée. Toute
/// tuile en échec fait échouer l'image entière.
pub async fn fetch_wms_image(
    http: &HttpClient,
    endpoint: &str,
    request: &WmsRequest,
    jobs: usize,
) -> Result<Vec<u8>> {
    if fits_single_request(request.width_px, request.height_px, MAX_TILE_SIZE) {
        let bytes = fetch_tile(http, endpoint, request).await?;
        return Ok(bytes.to_vec());
    }

    let tiles = partition(request.bbox, request.width_px, request.height_px, MAX_TILE_SIZE);
    info!(
        layer = %request.layer,
        width = request.width_px,
        height = request.height_px,
        tiles = tiles.len(),
        "Image WMS découpée en tuiles"
    );

    let fetched: Vec<(TileSpec, Bytes)> = stream::iter(tiles)
        .map(|tile| {
            let sub = request.with_extent(tile.bbox, tile.width, tile.height);
            async move {
                let bytes = fetch_tile(http, endpoint, &sub)
                    .await
                    .with_context(|| format!("Tile ({}, {}) failed", tile.x, tile.y))?;
                Ok::<_, anyhow::Error>((tile, bytes))
            }
        })
        .buffered(jobs.max(1))
        .try_collect()
        .await?;

    let (width, height, format) = (request.width_px, request.height_px, request.format);
    tokio::task::spawn_blocking(move || compose_tiles(width, height, format, fetched))
        .await
        .context("Tile composition task panicked")?
}

/// Récupère l'image puis l'écrit sur disque
pub async fn save_wms_image(
    http: &HttpClient,
    endpoint: &str,
    request: &WmsRequest,
    out_path: &Path,
    jobs: usize,
) -> Result<PathBuf> {
    let bytes = fetch_wms_image(http, endpoint, request, jobs).await?;
    tokio::fs::write(out_path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    debug!(path = %out_path.display(), size = bytes.len(), "Image WMS enregistrée");
    Ok(out_path.to_path_buf())
}

async fn fetch_tile(http: &HttpClient, endpoint: &str, request: &WmsRequest) -> Result<Bytes> {
    let bytes = http
        .fetch_bytes(endpoint, &get_map_params(request))
        .await
        .with_context(|| format!("GetMap {} failed", request.layer))?;

    // Un WMS répond souvent 200 avec un ServiceException XML
    if image::guess_format(&bytes).is_err() {
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]).into_owned();
        anyhow::bail!("GetMap {} returned no image: {}", request.layer, head.trim());
    }
    Ok(bytes)
}

/// Assemble les tuiles décodées sur un canevas aux dimensions demandées
///
/// Le décodage est parallélisé ; la copie est sans perte (aucun rééchantillonnage).
pub fn compose_tiles(
    width: u32,
    height: u32,
    format: ImageFormat,
    tiles: Vec<(TileSpec, Bytes)>,
) -> Result<Vec<u8>> {
    let decoded: Vec<(TileSpec, RgbaImage)> = tiles
        .into_par_iter()
        .map(|(tile, bytes)| {
            let img = image::load_from_memory(&bytes)
                .with_context(|| format!("Failed to decode tile ({}, {})", tile.x, tile.y))?
                .to_rgba8();
            if img.dimensions() != (tile.width, tile.height) {
                anyhow::bail!(
                    "Tile ({}, {}) is {}x{}, expected {}x{}",
                    tile.x,
                    tile.y,
                    img.width(),
                    img.height(),
                    tile.width,
                    tile.height
                );
            }
            Ok((tile, img))
        })
        .collect::<Result<_>>()?;

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0]));
    for (tile, img) in &decoded {
        imageops::replace(&mut canvas, img, i64::from(tile.x), i64::from(tile.y));
    }

    encode_image(canvas, format)
}

/// Encode un canevas RGBA dans le format demandé (JPEG sans alpha)
pub fn encode_image(canvas: RgbaImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Png => canvas
            .write_with_encoder(PngEncoder::new(&mut out))
            .context("PNG encoding failed")?,
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
            .context("JPEG encoding failed")?,
    }
    Ok(out.into_inner())
}
