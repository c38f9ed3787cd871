//! Canvas Preset Resolver
//!
//! Resolution priority: named preset > explicit dimensions > orientation table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Square,
    Wide,
    Story,
}

impl Orientation {
    pub fn size(self) -> CanvasSize {
        match self {
            Orientation::Square => CanvasSize::new(1024, 1024),
            Orientation::Wide => CanvasSize::new(1280, 720),
            Orientation::Story => CanvasSize::new(1080, 1920),
        }
    }
}

/// Social-network specific canvas sizes offered to template authors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasPreset {
    InstagramPost,
    InstagramPortrait,
    InstagramStory,
    FacebookPost,
    TwitterPost,
    LinkedinPost,
    YoutubeThumbnail,
    PinterestPin,
}

impl CanvasPreset {
    pub const ALL: [CanvasPreset; 8] = [
        CanvasPreset::InstagramPost,
        CanvasPreset::InstagramPortrait,
        CanvasPreset::InstagramStory,
        CanvasPreset::FacebookPost,
        CanvasPreset::TwitterPost,
        CanvasPreset::LinkedinPost,
        CanvasPreset::YoutubeThumbnail,
        CanvasPreset::PinterestPin,
    ];

    pub fn size(self) -> CanvasSize {
        match self {
            CanvasPreset::InstagramPost => CanvasSize::new(1080, 1080),
            CanvasPreset::InstagramPortrait => CanvasSize::new(1080, 1350),
            CanvasPreset::InstagramStory => CanvasSize::new(1080, 1920),
            CanvasPreset::FacebookPost => CanvasSize::new(1200, 630),
            CanvasPreset::TwitterPost => CanvasSize::new(1200, 675),
            CanvasPreset::LinkedinPost => CanvasSize::new(1200, 627),
            CanvasPreset::YoutubeThumbnail => CanvasSize::new(1280, 720),
            CanvasPreset::PinterestPin => CanvasSize::new(1000, 1500),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            CanvasPreset::InstagramPost => "instagram-post",
            CanvasPreset::InstagramPortrait => "instagram-portrait",
            CanvasPreset::InstagramStory => "instagram-story",
            CanvasPreset::FacebookPost => "facebook-post",
            CanvasPreset::TwitterPost => "twitter-post",
            CanvasPreset::LinkedinPost => "linkedin-post",
            CanvasPreset::YoutubeThumbnail => "youtube-thumbnail",
            CanvasPreset::PinterestPin => "pinterest-pin",
        }
    }
}

impl std::str::FromStr for CanvasPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanvasPreset::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| format!("unknown canvas preset: {s}"))
    }
}

/// Caller-supplied explicit width/height override.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<Dimensions> for CanvasSize {
    fn from(d: Dimensions) -> Self {
        Self::new(d.width, d.height)
    }
}

/// Pick the target raster size for a render.
pub fn resolve_canvas(
    orientation: Orientation,
    preset: Option<CanvasPreset>,
    dimensions: Option<Dimensions>,
) -> CanvasSize {
    if let Some(preset) = preset {
        return preset.size();
    }
    if let Some(dimensions) = dimensions {
        return dimensions.into();
    }
    orientation.size()
}
