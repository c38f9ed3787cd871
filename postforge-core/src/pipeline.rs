//! Render Pipeline - Single Entry Point
//!
//! Every render validates, resolves the canvas, composites, encodes and
//! persists. It either returns a reference to a complete artifact or an
//! error with nothing referenced.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::background::load_background;
use crate::canvas::{resolve_canvas, CanvasPreset, Dimensions};
use crate::compose::Compositor;
use crate::config::RenderConfig;
use crate::content::{Content, ContentValue};
use crate::emotion::{emotion_color, parse_hex_color};
use crate::hashing::{compute_job_hash, sha256_hex};
use crate::output::{encode_png, persist};
use crate::storage::{LocalStorage, Storage};
use crate::templates::Template;
use crate::validation::Validator;
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Background load failed for {reference}: {reason}")]
    BackgroundLoad { reference: String, reason: String },

    #[error("Persistence failed for {path}: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    pub fn background(reference: &str, reason: impl std::fmt::Display) -> Self {
        Self::BackgroundLoad {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template: Template,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub preset: Option<CanvasPreset>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

impl RenderRequest {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            background: None,
            emotion: None,
            content: Content::new(),
            preset: None,
            dimensions: None,
        }
    }

    pub fn background(mut self, reference: impl Into<String>) -> Self {
        self.background = Some(reference.into());
        self
    }

    pub fn emotion(mut self, emotion: impl Into<String>) -> Self {
        self.emotion = Some(emotion.into());
        self
    }

    pub fn content(mut self, key: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.content.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderArtifact {
    pub id: String,
    pub path: String,
    pub template_id: Option<String>,
    pub engine_version: String,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
    pub job_hash: String,
    pub image_hash: String,
}

/// The render pipeline - one renderer serves many concurrent renders
pub struct Renderer<S = LocalStorage> {
    storage: S,
    compositor: Compositor,
    validator: Validator,
    client: reqwest::Client,
}

impl Renderer<LocalStorage> {
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        let storage = LocalStorage::new(&config.asset_root, &config.output_root);
        Self::with_storage(config, storage)
    }
}

impl<S: Storage> Renderer<S> {
    pub fn with_storage(config: &RenderConfig, storage: S) -> Result<Self, RenderError> {
        Ok(Self {
            storage,
            compositor: Compositor::from_config(config)?,
            validator: Validator::new(),
            client: reqwest::Client::new(),
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Check render preconditions.
    pub fn validate(&self, request: &RenderRequest) -> Result<(), RenderError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let violations = self.validator.validate(request);
        if violations.is_empty() {
            return Ok(());
        }
        let messages: Vec<_> = violations
            .iter()
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect();
        Err(RenderError::MalformedTemplate(messages.join("; ")))
    }

    /// Render and return the stored-image reference.
    pub async fn render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        self.render_artifact(request).await.map(|artifact| artifact.path)
    }

    /// Render and return the full artifact manifest.
    #[tracing::instrument(skip_all, fields(orientation = ?request.template.orientation, template = ?request.template.id))]
    pub async fn render_artifact(&self, request: &RenderRequest) -> Result<RenderArtifact, RenderError> {
        // MANDATORY: nothing is fetched or drawn for a request that fails validation.
        self.validate(request)?;

        let size = resolve_canvas(request.template.orientation, request.preset, request.dimensions);
        tracing::debug!(width = size.width, height = size.height, "canvas resolved");

        let background = match request.background.as_deref() {
            Some(reference) => Some(load_background(&self.client, &self.storage, reference).await?),
            None => None,
        };

        // Palette entries are valid hex, so the fallback is never reached.
        let tint = parse_hex_color(emotion_color(request.emotion.as_deref())).unwrap_or([255, 255, 255]);

        let pixmap = self.compositor.compose(
            size,
            background.as_ref(),
            tint,
            &request.template.placeholders,
            &request.content,
        )?;
        drop(background);

        let png = encode_png(&pixmap)?;
        drop(pixmap);

        let job_hash = compute_job_hash(request, ENGINE_VERSION)?;
        let image_hash = sha256_hex(&png);

        let id = Uuid::new_v4();
        let path = persist(&self.storage, &id, png).await?;
        tracing::debug!(%path, "artifact persisted");

        Ok(RenderArtifact {
            id: id.to_string(),
            path,
            template_id: request.template.id.clone(),
            engine_version: ENGINE_VERSION.to_string(),
            width: size.width,
            height: size.height,
            created_at: Utc::now(),
            job_hash,
            image_hash,
        })
    }
}
