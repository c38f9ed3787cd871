//! Background resolution: network references are fetched, everything else is
//! read from the asset root through the storage collaborator.

use image::RgbaImage;

use crate::pipeline::RenderError;
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSource<'a> {
    Remote(&'a str),
    Local(&'a str),
}

impl<'a> BackgroundSource<'a> {
    pub fn classify(reference: &'a str) -> Self {
        let lower = reference.trim_start().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            BackgroundSource::Remote(reference.trim())
        } else {
            BackgroundSource::Local(reference.trim())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackgroundSource::Remote(_) => "remote",
            BackgroundSource::Local(_) => "local",
        }
    }
}

/// Fetch or read the background and decode it. Any failure is fatal for the
/// render.
pub async fn load_background<S: Storage>(
    client: &reqwest::Client,
    storage: &S,
    reference: &str,
) -> Result<RgbaImage, RenderError> {
    let source = BackgroundSource::classify(reference);
    tracing::debug!(source = source.kind(), reference, "loading background");

    let bytes = match source {
        BackgroundSource::Remote(url) => fetch(client, url)
            .await
            .map_err(|e| RenderError::background(reference, e))?,
        BackgroundSource::Local(path) => storage
            .read(path)
            .await
            .map_err(|e| RenderError::background(reference, e))?,
    };

    decode(&bytes).map_err(|e| RenderError::background(reference, e))
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

fn decode(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}
