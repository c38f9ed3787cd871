//! Renderer configuration and the fixed drawing defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";
pub const DEFAULT_FONT_SIZE: f32 = 32.0;
pub const DEFAULT_TEXT_COLOR: &str = "#FFFFFF";
pub const FALLBACK_FILL: &str = "#1A1A1A";
pub const TINT_OPACITY: f32 = 0.15;

/// Subpath of the output root that receives rendered artifacts.
pub const RENDERED_PREFIX: &str = "uploads/rendered";
pub const MAX_CANVAS_EDGE: u32 = 8192;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Root that relative background references resolve against.
    pub asset_root: PathBuf,
    /// Root under which `uploads/rendered/` is written.
    pub output_root: PathBuf,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    #[serde(default = "default_true")]
    pub system_fonts: bool,
    #[serde(default = "default_font_size")]
    pub default_font_size: f32,
    #[serde(default = "default_text_color")]
    pub default_text_color: String,
    #[serde(default = "default_fallback_fill")]
    pub fallback_fill: String,
    #[serde(default = "default_tint_opacity")]
    pub tint_opacity: f32,
}

fn default_true() -> bool { true }
fn default_font_family() -> String { DEFAULT_FONT_FAMILY.to_string() }
fn default_font_size() -> f32 { DEFAULT_FONT_SIZE }
fn default_text_color() -> String { DEFAULT_TEXT_COLOR.to_string() }
fn default_fallback_fill() -> String { FALLBACK_FILL.to_string() }
fn default_tint_opacity() -> f32 { TINT_OPACITY }

impl RenderConfig {
    pub fn new(asset_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            output_root: output_root.into(),
            font_family: default_font_family(),
            font_dirs: vec![],
            system_fonts: true,
            default_font_size: DEFAULT_FONT_SIZE,
            default_text_color: default_text_color(),
            fallback_fill: default_fallback_fill(),
            tint_opacity: TINT_OPACITY,
        }
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: RenderConfig = serde_json::from_value(json!({
            "assetRoot": "/srv/assets",
            "outputRoot": "/srv/public"
        }))
        .unwrap();

        assert_eq!(config.font_family, DEFAULT_FONT_FAMILY);
        assert_eq!(config.default_font_size, 32.0);
        assert_eq!(config.fallback_fill, "#1A1A1A");
        assert_eq!(config.tint_opacity, 0.15);
        assert!(config.system_fonts);
        assert!(config.font_dirs.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        fs::write(
            &path,
            r##"{"assetRoot": "a", "outputRoot": "b", "fallbackFill": "#000000", "systemFonts": false}"##,
        )
        .unwrap();

        let config = RenderConfig::load(&path).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("a"));
        assert_eq!(config.fallback_fill, "#000000");
        assert!(!config.system_fonts);
    }
}
