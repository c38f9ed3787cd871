//! Output Encoder & Persister

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use resvg::tiny_skia::Pixmap;
use uuid::Uuid;

use crate::compose::to_rgba_image;
use crate::config::RENDERED_PREFIX;
use crate::pipeline::RenderError;
use crate::storage::Storage;

/// Encode the surface as PNG at maximum compression.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let image = to_rgba_image(pixmap)?;
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive);
    encoder
        .write_image(image.as_raw(), image.width(), image.height(), ExtendedColorType::Rgba8)
        .map_err(|e| RenderError::Persistence {
            path: RENDERED_PREFIX.to_string(),
            source: std::io::Error::other(e),
        })?;
    Ok(bytes)
}

/// Relative storage key for an artifact id, always forward-slash separated.
pub fn artifact_key(id: &Uuid) -> String {
    format!("{}/{}.png", RENDERED_PREFIX, id)
}

/// Write encoded bytes under a fresh unique name and return the public
/// reference (`/uploads/rendered/<uuid>.png`).
pub async fn persist<S: Storage>(storage: &S, id: &Uuid, bytes: Vec<u8>) -> Result<String, RenderError> {
    let key = artifact_key(id);
    storage
        .write(&key, bytes)
        .await
        .map_err(|source| RenderError::Persistence {
            path: key.clone(),
            source,
        })?;
    Ok(format!("/{key}"))
}
