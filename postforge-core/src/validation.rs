//! Validation System - Precondition Checks
//!
//! Upstream schema validation normally guarantees these; if a request slips
//! through anyway the render fails loudly instead of guessing.

use serde::{Deserialize, Serialize};

use crate::config::MAX_CANVAS_EDGE;
use crate::emotion::parse_hex_color;
use crate::pipeline::RenderRequest;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationViolation {
    pub rule: String,
    pub message: String,
}

/// Validation rule trait - produces violations
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation>;

    fn violation(&self, message: String) -> ValidationViolation {
        ValidationViolation {
            rule: self.name().to_string(),
            message,
        }
    }
}

// --- Concrete Rules ---

pub struct CanvasDimensionsRule;

impl ValidationRule for CanvasDimensionsRule {
    fn name(&self) -> &'static str { "canvas_dimensions" }

    fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation> {
        // A preset wins over explicit dimensions, so they are never used.
        if request.preset.is_some() {
            return vec![];
        }
        let Some(d) = request.dimensions else {
            return vec![];
        };

        let mut violations = vec![];
        if d.width == 0 || d.height == 0 {
            violations.push(self.violation(format!("canvas {}x{} has a zero edge", d.width, d.height)));
        }
        if d.width > MAX_CANVAS_EDGE || d.height > MAX_CANVAS_EDGE {
            violations.push(self.violation(format!(
                "canvas {}x{} exceeds {} px per edge",
                d.width, d.height, MAX_CANVAS_EDGE
            )));
        }
        violations
    }
}

pub struct PlaceholderGeometryRule;

impl ValidationRule for PlaceholderGeometryRule {
    fn name(&self) -> &'static str { "placeholder_geometry" }

    fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation> {
        let mut violations = vec![];
        for p in &request.template.placeholders {
            if !p.x.is_finite() || !p.y.is_finite() {
                violations.push(self.violation(format!("'{}' has non-finite position", p.key)));
            }
            if let Some(size) = p.font_size {
                if !size.is_finite() || size <= 0.0 {
                    violations.push(self.violation(format!("'{}' has invalid fontSize {}", p.key, size)));
                }
            }
        }
        violations
    }
}

pub struct PlaceholderKeyRule;

impl ValidationRule for PlaceholderKeyRule {
    fn name(&self) -> &'static str { "placeholder_key" }

    fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation> {
        request
            .template
            .placeholders
            .iter()
            .enumerate()
            .filter(|(_, p)| p.key.trim().is_empty())
            .map(|(i, _)| self.violation(format!("placeholder #{i} has an empty key")))
            .collect()
    }
}

pub struct PlaceholderColorRule;

impl ValidationRule for PlaceholderColorRule {
    fn name(&self) -> &'static str { "placeholder_color" }

    fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation> {
        request
            .template
            .placeholders
            .iter()
            .filter_map(|p| p.color.as_deref().map(|color| (p, color)))
            .filter(|(_, color)| parse_hex_color(color).is_none())
            .map(|(p, color)| self.violation(format!("'{}' has unparsable color '{}'", p.key, color)))
            .collect()
    }
}

/// Validator runs every rule and reports all violations at once
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CanvasDimensionsRule),
                Box::new(PlaceholderGeometryRule),
                Box::new(PlaceholderKeyRule),
                Box::new(PlaceholderColorRule),
            ],
        }
    }

    pub fn validate(&self, request: &RenderRequest) -> Vec<ValidationViolation> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(request))
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasPreset, Dimensions, Orientation};
    use crate::templates::{Placeholder, Template};

    fn request(template: Template) -> RenderRequest {
        RenderRequest::new(template)
    }

    #[test]
    fn test_clean_request_has_no_violations() {
        let template = Template::new(Orientation::Square)
            .with_placeholder(Placeholder::text("title", 10.0, 20.0).font_size(40.0));
        assert!(Validator::new().validate(&request(template)).is_empty());
    }

    #[test]
    fn test_zero_and_oversized_dimensions() {
        let mut req = request(Template::new(Orientation::Wide));
        req.dimensions = Some(Dimensions { width: 0, height: 9000 });

        let violations = Validator::new().validate(&req);
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.rule == "canvas_dimensions"));

        req.preset = Some(CanvasPreset::TwitterPost);
        assert!(Validator::new().validate(&req).is_empty());
    }

    #[test]
    fn test_bad_geometry_and_keys() {
        let template = Template::new(Orientation::Story)
            .with_placeholder(Placeholder::text("a", f64::NAN, 0.0))
            .with_placeholder(Placeholder::text("b", 0.0, 0.0).font_size(0.0))
            .with_placeholder(Placeholder::text("  ", 0.0, 0.0));

        let rules: Vec<_> = Validator::new()
            .validate(&request(template))
            .into_iter()
            .map(|v| v.rule)
            .collect();
        assert_eq!(rules, vec!["placeholder_geometry", "placeholder_geometry", "placeholder_key"]);
    }

    #[test]
    fn test_colors_must_be_hex() {
        let template = Template::new(Orientation::Square)
            .with_placeholder(Placeholder::text("ok", 0.0, 0.0).color("#ffffff"))
            .with_placeholder(Placeholder::text("short", 0.0, 0.0).color("#fff"))
            .with_placeholder(Placeholder::text("bad", 0.0, 0.0).color("notacolor"));

        let violations = Validator::new().validate(&request(template));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "placeholder_color");
        assert!(violations[0].message.contains("notacolor"));
    }
}
