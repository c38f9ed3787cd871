//! PostForge Core - Template Compositing Engine
//!
//! # Render Contract
//! 1. Canvas size is fixed before anything is drawn
//! 2. Draw order is background, tint, then placeholders as stored
//! 3. Identical requests produce identical pixels
//! 4. Every artifact gets a name no other render can produce
//! 5. A render fully succeeds or leaves nothing referenced

pub mod background;
pub mod canvas;
pub mod compose;
pub mod config;
pub mod content;
pub mod emotion;
pub mod hashing;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod templates;
pub mod validation;

pub use canvas::{resolve_canvas, CanvasPreset, CanvasSize, Dimensions, Orientation};
pub use config::RenderConfig;
pub use content::{Content, ContentValue};
pub use emotion::emotion_color;
pub use hashing::{canonical_json, compute_job_hash, sha256_hex};
pub use pipeline::{RenderArtifact, RenderError, RenderRequest, Renderer};
pub use storage::{LocalStorage, Storage};
pub use templates::{Placeholder, PlaceholderKind, ShapeKind, Template};
pub use validation::{ValidationRule, ValidationViolation, Validator};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
