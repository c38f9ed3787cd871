//! Template System - What To Draw And Where

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::canvas::Orientation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub orientation: Orientation,
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
}

impl Template {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            id: None,
            name: None,
            orientation,
            placeholders: vec![],
        }
    }

    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholders.push(placeholder);
        self
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// A positioned, typed slot in a template.
///
/// Only `key`, `kind`, `x`, `y`, `font_size` and `color` feed the render path.
/// The remaining styling attributes are part of the stored schema and survive
/// a round trip, but nothing draws them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: PlaceholderKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
}

impl Placeholder {
    pub fn text(key: impl Into<String>, x: f64, y: f64) -> Self {
        Self::of_kind(PlaceholderKind::Text, key, x, y)
    }

    pub fn of_kind(kind: PlaceholderKind, key: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            key: key.into(),
            kind,
            x,
            y,
            font_size: None,
            color: None,
            font_weight: None,
            width: None,
            height: None,
            rotation: None,
            opacity: None,
            z_index: None,
            border_width: None,
            border_color: None,
            border_radius: None,
            src: None,
            shape: None,
        }
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    Text,
    Image,
    Shape,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_from_stored_json() {
        let raw = json!({
            "orientation": "story",
            "placeholders": [
                {"key": "title", "type": "text", "x": 120, "y": 200, "fontSize": 48, "color": "#ffffff"},
                {"key": "logo", "type": "image", "x": 10, "y": 10, "src": "/uploads/logo.png", "zIndex": 4},
                {"key": "badge", "type": "shape", "x": 0, "y": 0, "shape": "circle", "borderWidth": 2}
            ]
        });
        let template: Template = serde_json::from_value(raw).unwrap();

        assert_eq!(template.orientation, Orientation::Story);
        assert_eq!(template.placeholders.len(), 3);
        assert_eq!(template.placeholders[0].kind, PlaceholderKind::Text);
        assert_eq!(template.placeholders[0].font_size, Some(48.0));
        assert_eq!(template.placeholders[1].z_index, Some(4));
        assert_eq!(template.placeholders[2].shape, Some(ShapeKind::Circle));
    }

    #[test]
    fn test_unknown_orientation_rejected() {
        let raw = json!({"orientation": "panorama", "placeholders": []});
        assert!(serde_json::from_value::<Template>(raw).is_err());
    }

    #[test]
    fn test_unknown_placeholder_type_rejected() {
        let raw = json!({
            "orientation": "square",
            "placeholders": [{"key": "k", "type": "video", "x": 0, "y": 0}]
        });
        assert!(serde_json::from_value::<Template>(raw).is_err());
    }
}
