//! Compositing Engine
//!
//! Draw order is fixed: background (or fallback fill), tint wash, then text
//! placeholders in stored sequence. Later draws cover earlier ones.

use std::fmt::Write as _;
use std::sync::Arc;

use image::imageops::FilterType;
use image::RgbaImage;
use resvg::tiny_skia::{Color, ColorU8, Paint, Pixmap, PixmapPaint, Rect, Transform};
use resvg::usvg::{self, fontdb};

use crate::canvas::CanvasSize;
use crate::config::{RenderConfig, RENDERED_PREFIX};
use crate::content::{text_for, Content};
use crate::emotion::parse_hex_color;
use crate::pipeline::RenderError;
use crate::templates::{Placeholder, PlaceholderKind};

/// Holds the drawing defaults and the shared font database.
pub struct Compositor {
    fonts: Arc<fontdb::Database>,
    font_family: String,
    default_font_size: f32,
    default_text_color: String,
    fallback_fill: [u8; 3],
    tint_opacity: f32,
}

impl Compositor {
    pub fn from_config(config: &RenderConfig) -> Result<Self, RenderError> {
        let fallback_fill = parse_hex_color(&config.fallback_fill).ok_or_else(|| {
            RenderError::Config(format!("fallbackFill is not a hex color: {}", config.fallback_fill))
        })?;
        if parse_hex_color(&config.default_text_color).is_none() {
            return Err(RenderError::Config(format!(
                "defaultTextColor is not a hex color: {}",
                config.default_text_color
            )));
        }
        if !(0.0..=1.0).contains(&config.tint_opacity) {
            return Err(RenderError::Config(format!(
                "tintOpacity must be within 0..=1, got {}",
                config.tint_opacity
            )));
        }
        if !(config.default_font_size.is_finite() && config.default_font_size > 0.0) {
            return Err(RenderError::Config(format!(
                "defaultFontSize must be positive, got {}",
                config.default_font_size
            )));
        }

        let mut fonts = fontdb::Database::new();
        if config.system_fonts {
            fonts.load_system_fonts();
        }
        for dir in &config.font_dirs {
            fonts.load_fonts_dir(dir);
        }
        if fonts.len() == 0 {
            return Err(RenderError::Config(
                "no font faces loaded; enable systemFonts or list fontDirs".to_string(),
            ));
        }
        tracing::debug!(faces = fonts.len(), "font database loaded");

        Ok(Self {
            fonts: Arc::new(fonts),
            font_family: config.font_family.clone(),
            default_font_size: config.default_font_size,
            default_text_color: config.default_text_color.clone(),
            fallback_fill,
            tint_opacity: config.tint_opacity,
        })
    }

    /// Produce the fully drawn raster surface.
    pub fn compose(
        &self,
        size: CanvasSize,
        background: Option<&RgbaImage>,
        tint: [u8; 3],
        placeholders: &[Placeholder],
        content: &Content,
    ) -> Result<Pixmap, RenderError> {
        let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
            RenderError::MalformedTemplate(format!(
                "cannot allocate a {}x{} canvas",
                size.width, size.height
            ))
        })?;

        match background {
            Some(image) => draw_background(&mut pixmap, image)?,
            None => {
                let [r, g, b] = self.fallback_fill;
                pixmap.fill(Color::from_rgba8(r, g, b, 255));
            }
        }

        self.draw_tint(&mut pixmap, tint);

        if let Some(svg) = self.text_overlay_svg(size, placeholders, content) {
            let mut options = usvg::Options::default();
            options.font_family = self.font_family.clone();
            options.font_size = self.default_font_size;
            options.fontdb = Arc::clone(&self.fonts);
            options.font_resolver = font_resolver();

            let tree = usvg::Tree::from_str(&svg, &options)
                .map_err(|e| RenderError::MalformedTemplate(format!("text overlay: {e}")))?;
            resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
        }

        Ok(pixmap)
    }

    fn draw_tint(&self, pixmap: &mut Pixmap, tint: [u8; 3]) {
        let [r, g, b] = tint;
        let alpha = (self.tint_opacity * 255.0).round() as u8;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, alpha);
        paint.anti_alias = false;

        if let Some(rect) = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    /// SVG document holding every drawable text placeholder, or `None` when
    /// no placeholder has content.
    pub fn text_overlay_svg(
        &self,
        size: CanvasSize,
        placeholders: &[Placeholder],
        content: &Content,
    ) -> Option<String> {
        let mut body = String::new();
        let mut drawn = 0usize;

        for placeholder in placeholders {
            if placeholder.kind != PlaceholderKind::Text {
                continue;
            }
            let Some(text) = text_for(content, &placeholder.key) else {
                tracing::debug!(key = %placeholder.key, "no content, placeholder skipped");
                continue;
            };

            let font_size = placeholder.font_size.unwrap_or(self.default_font_size);
            let color = placeholder.color.as_deref().unwrap_or(&self.default_text_color);
            let _ = write!(
                body,
                r#"<text x="{}" y="{}" font-family="{}" font-size="{}" fill="{}" xml:space="preserve">{}</text>"#,
                placeholder.x,
                placeholder.y,
                escape_xml(&self.font_family),
                font_size,
                escape_xml(color),
                escape_xml(&text),
            );
            drawn += 1;
        }

        if drawn == 0 {
            return None;
        }
        Some(format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = size.width,
            h = size.height,
        ))
    }
}

/// Stretch `image` over the whole canvas; aspect ratio is not preserved.
fn draw_background(pixmap: &mut Pixmap, image: &RgbaImage) -> Result<(), RenderError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let scaled = if image.dimensions() == (width, height) {
        image.clone()
    } else {
        image::imageops::resize(image, width, height, FilterType::Triangle)
    };

    let mut layer = Pixmap::new(width, height).ok_or_else(|| {
        RenderError::MalformedTemplate(format!("cannot allocate a {width}x{height} layer"))
    })?;
    for (dst, src) in layer.pixels_mut().iter_mut().zip(scaled.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    pixmap.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    Ok(())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Straight-alpha RGBA copy of a premultiplied pixmap.
pub fn to_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw).ok_or_else(|| {
        RenderError::Persistence {
            path: RENDERED_PREFIX.to_string(),
            source: std::io::Error::other(format!(
                "pixel buffer does not match a {}x{} surface",
                pixmap.width(),
                pixmap.height()
            )),
        }
    })
}

/// Query the requested families, then the generic ones, and finally settle
/// on any regular face so text is never dropped for want of a family name.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(name) => fontdb::Family::Name(name),
                })
                .collect();
            families.push(fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };
            if let Some(id) = db.query(&query) {
                return Some(id);
            }

            db.faces()
                .find(|face| face.style == fontdb::Style::Normal && face.weight == fontdb::Weight::NORMAL)
                .or_else(|| db.faces().next())
                .map(|face| face.id)
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentValue;
    use image::Rgba;

    fn test_config() -> RenderConfig {
        let mut config = RenderConfig::new("assets", "public");
        config.system_fonts = false;
        config.font_dirs = vec![concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts").into()];
        config
    }

    fn compositor() -> Compositor {
        Compositor::from_config(&test_config()).unwrap()
    }

    fn count(image: &RgbaImage, pred: impl Fn(&Rgba<u8>) -> bool) -> usize {
        image.pixels().filter(|px| pred(*px)).count()
    }

    fn content(pairs: &[(&str, ContentValue)]) -> Content {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn near(a: u8, b: u8) -> bool {
        a.abs_diff(b) <= 2
    }

    #[test]
    fn test_fallback_fill_with_white_wash() {
        let pixmap = compositor()
            .compose(CanvasSize::new(8, 8), None, [255, 255, 255], &[], &Content::new())
            .unwrap();
        let image = to_rgba_image(&pixmap).unwrap();
        let px = image.get_pixel(3, 3);

        // 26 + (255 - 26) * 38 / 255 ~= 60
        assert!(near(px[0], 60), "got {:?}", px);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_tint_uses_emotion_color() {
        let pixmap = compositor()
            .compose(CanvasSize::new(4, 4), None, [255, 0, 0], &[], &Content::new())
            .unwrap();
        let px = *to_rgba_image(&pixmap).unwrap().get_pixel(0, 0);
        assert!(px[0] > px[1]);
        assert!(near(px[1], 22));
    }

    #[test]
    fn test_background_stretches_to_canvas() {
        let mut bg = RgbaImage::new(2, 1);
        bg.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        bg.put_pixel(1, 0, Rgba([0, 0, 255, 255]));

        let pixmap = compositor()
            .compose(CanvasSize::new(100, 40), Some(&bg), [255, 255, 255], &[], &Content::new())
            .unwrap();
        let image = to_rgba_image(&pixmap).unwrap();

        let left = image.get_pixel(2, 20);
        let right = image.get_pixel(97, 5);
        assert!(left[0] > 200 && left[2] < 60, "left {:?}", left);
        assert!(right[2] > 200 && right[0] < 60, "right {:?}", right);
    }

    #[test]
    fn test_overlay_joins_sequences_and_skips_others() {
        let placeholders = vec![
            Placeholder::text("headline", 10.0, 50.0).font_size(48.0),
            Placeholder::of_kind(PlaceholderKind::Image, "logo", 0.0, 0.0),
            Placeholder::text("missing", 5.0, 5.0),
        ];
        let content = content(&[
            ("headline", ContentValue::Lines(vec!["Flash".into(), "Sale".into(), "50%".into()])),
            ("logo", ContentValue::Text("/uploads/logo.png".into())),
        ]);

        let svg = compositor()
            .text_overlay_svg(CanvasSize::new(100, 100), &placeholders, &content)
            .unwrap();

        assert!(svg.contains(">Flash Sale 50%</text>"));
        assert!(svg.contains(r#"x="10" y="50""#));
        assert!(svg.contains(r#"font-size="48""#));
        assert!(svg.contains(r##"fill="#FFFFFF""##));
        assert!(!svg.contains("logo"));
        assert_eq!(svg.matches("<text").count(), 1);
    }

    #[test]
    fn test_overlay_escapes_markup() {
        let placeholders = vec![Placeholder::text("t", 0.0, 10.0).color("#000")];
        let content = content(&[("t", ContentValue::Text("Fish & <Chips>".into()))]);
        let svg = compositor()
            .text_overlay_svg(CanvasSize::new(10, 10), &placeholders, &content)
            .unwrap();
        assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn test_overlay_absent_without_content() {
        let placeholders = vec![Placeholder::text("title", 0.0, 0.0)];
        assert!(compositor()
            .text_overlay_svg(CanvasSize::new(10, 10), &placeholders, &Content::new())
            .is_none());
    }

    #[test]
    fn test_unknown_family_still_draws_text() {
        let mut config = test_config();
        config.font_family = "No Such Family".into();
        let compositor = Compositor::from_config(&config).unwrap();

        let placeholders = vec![Placeholder::text("title", 4.0, 40.0).font_size(32.0)];
        let content = content(&[("title", ContentValue::Text("Sale".into()))]);
        let pixmap = compositor
            .compose(CanvasSize::new(120, 60), None, [255, 255, 255], &placeholders, &content)
            .unwrap();
        let image = to_rgba_image(&pixmap).unwrap();

        assert!(count(&image, |px| px[0] > 200 && px[1] > 200 && px[2] > 200) > 50);
    }

    #[test]
    fn test_later_placeholder_covers_earlier() {
        let mut first = Placeholder::text("under", 4.0, 48.0).font_size(48.0).color("#FF0000");
        first.z_index = Some(10);
        let second = Placeholder::text("over", 4.0, 48.0).font_size(48.0).color("#0000FF");
        let content = content(&[
            ("under", ContentValue::Text("M".into())),
            ("over", ContentValue::Text("M".into())),
        ]);

        let pixmap = compositor()
            .compose(CanvasSize::new(64, 64), None, [255, 255, 255], &[first, second], &content)
            .unwrap();
        let image = to_rgba_image(&pixmap).unwrap();

        assert!(count(&image, |px| px[2] > 200 && px[0] < 80) > 50);
        assert_eq!(count(&image, |px| px[0] > px[2].saturating_add(2)), 0);
    }

    #[test]
    fn test_rgba_copy_is_straight_alpha() {
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(Color::from_rgba8(200, 100, 50, 128));

        let image = to_rgba_image(&pixmap).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        let px = image.get_pixel(2, 1);
        assert!(near(px[0], 200) && near(px[1], 100) && near(px[2], 50), "got {:?}", px);
        assert_eq!(px[3], 128);
    }

    #[test]
    fn test_config_rejects_empty_font_database() {
        let mut config = test_config();
        config.font_dirs.clear();
        assert!(matches!(Compositor::from_config(&config), Err(RenderError::Config(_))));
    }

    #[test]
    fn test_config_rejects_bad_colors() {
        let mut config = test_config();
        config.fallback_fill = "dark".into();
        assert!(matches!(Compositor::from_config(&config), Err(RenderError::Config(_))));

        config.fallback_fill = "#1A1A1A".into();
        config.tint_opacity = 1.5;
        assert!(matches!(Compositor::from_config(&config), Err(RenderError::Config(_))));
    }
}
