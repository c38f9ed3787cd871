//! PostForge CLI - Bridge interface for the web backend
//!
//! Commands: render, presets, palette
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns non-zero on render failure

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use postforge_core::{
    canvas::{CanvasPreset, Dimensions},
    emotion::{DEFAULT_TINT, PALETTE},
    Content, RenderConfig, RenderRequest, Renderer, Template,
};

#[derive(Parser)]
#[command(name = "postforge-cli", version)]
#[command(about = "PostForge CLI - Template Compositing Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to a PNG under uploads/rendered/
    Render(RenderArgs),

    /// List canvas presets
    Presets,

    /// List emotion tint colors
    Palette,
}

#[derive(Parser)]
struct RenderArgs {
    /// Template JSON file
    #[arg(short, long)]
    template: PathBuf,

    /// Content JSON file (key -> string or list of strings)
    #[arg(short, long)]
    content: Option<PathBuf>,

    /// Background reference: http(s) URL or asset-root relative path
    #[arg(short, long)]
    background: Option<String>,

    /// Emotion tag selecting the tint color
    #[arg(short, long)]
    emotion: Option<String>,

    /// Named canvas preset, e.g. instagram-post
    #[arg(long)]
    preset: Option<CanvasPreset>,

    /// Explicit canvas width (requires --height)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Explicit canvas height (requires --width)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Renderer config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset root for relative backgrounds (overrides config)
    #[arg(long)]
    asset_root: Option<PathBuf>,

    /// Output root receiving uploads/rendered/ (overrides config)
    #[arg(long)]
    output_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets => {
            let presets: Vec<_> = CanvasPreset::ALL
                .iter()
                .map(|p| {
                    let size = p.size();
                    serde_json::json!({
                        "id": p.id(),
                        "width": size.width,
                        "height": size.height,
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(presets));
            ExitCode::SUCCESS
        }

        Commands::Palette => {
            let mut palette: serde_json::Map<_, _> = PALETTE
                .iter()
                .map(|(name, color)| (name.to_string(), serde_json::json!(color)))
                .collect();
            palette.insert("default".to_string(), serde_json::json!(DEFAULT_TINT));
            println!("{}", serde_json::Value::Object(palette));
            ExitCode::SUCCESS
        }

        Commands::Render(args) => match render(args).await {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                let output = serde_json::json!({
                    "success": false,
                    "error": format!("{e:#}"),
                });
                println!("{output}");
                ExitCode::from(2)
            }
        },
    }
}

async fn render(args: RenderArgs) -> anyhow::Result<serde_json::Value> {
    let config = resolve_config(args.config.as_deref(), args.asset_root, args.output_root)?;

    let template = Template::load(&args.template)
        .with_context(|| format!("load template {}", args.template.display()))?;
    let content: Content = match &args.content {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read content {}", path.display()))?;
            serde_json::from_str(&raw).context("parse content payload")?
        }
        None => Content::new(),
    };

    let request = RenderRequest {
        template,
        background: args.background,
        emotion: args.emotion,
        content,
        preset: args.preset,
        dimensions: args
            .width
            .zip(args.height)
            .map(|(width, height)| Dimensions { width, height }),
    };

    let renderer = Renderer::new(&config)?;
    let artifact = renderer.render_artifact(&request).await?;
    Ok(serde_json::json!({
        "success": true,
        "artifact": artifact,
    }))
}

/// Roots come from the config file, the flags, or both; the working directory
/// is never used as a default.
fn resolve_config(
    config: Option<&Path>,
    asset_root: Option<PathBuf>,
    output_root: Option<PathBuf>,
) -> anyhow::Result<RenderConfig> {
    let mut resolved = match config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => {
            let (Some(asset_root), Some(output_root)) = (asset_root.clone(), output_root.clone()) else {
                anyhow::bail!("either --config or both --asset-root and --output-root are required");
            };
            RenderConfig::new(asset_root, output_root)
        }
    };
    if let Some(root) = asset_root {
        resolved.asset_root = root;
    }
    if let Some(root) = output_root {
        resolved.output_root = root;
    }
    Ok(resolved)
}
