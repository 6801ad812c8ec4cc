//! Text shaping and glyph rasterization using cosmic-text
//!
//! Text is positioned by its top-left corner; multi-line strings are laid
//! out line by line with the font's own line height.

use std::path::Path;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use hashbrown::HashMap;
use tiny_skia::{Color, Pixmap};

use crate::RenderError;

const LINE_SPACING: f32 = 1.2;

/// Font actually used for drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFont {
    Named(String),
    /// The requested family was unavailable
    SansSerif,
    /// No font faces at all; text is not drawn
    Unavailable,
}

/// Shaped text with each glyph's line baseline
struct ShapedText {
    glyphs: Vec<(LayoutGlyph, f32)>,
    width: f32,
    height: f32,
}

/// Key for text cache: (text content, font size rounded to tenths)
type TextCacheKey = (String, u32);

pub struct TextRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    font: ResolvedFont,
    text_cache: HashMap<TextCacheKey, ShapedText>,
}

impl TextRenderer {
    /// Text renderer over the system fonts plus an optional font file.
    ///
    /// An unavailable family is logged and replaced by sans-serif.
    pub fn new(family: &str, font_path: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::with_database(db, family, font_path)
    }

    pub fn with_database(
        mut db: fontdb::Database,
        family: &str,
        font_path: Option<&Path>,
    ) -> Self {
        let font = match install_font(&mut db, family, font_path) {
            Ok(name) => ResolvedFont::Named(name),
            Err(e) if db.is_empty() => {
                tracing::warn!(error = %e, "No fonts installed, chart text is skipped");
                ResolvedFont::Unavailable
            }
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to sans-serif");
                ResolvedFont::SansSerif
            }
        };

        let locale = sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string());
        tracing::debug!(font = ?font, faces = db.len(), "Initialized text renderer");

        Self {
            font_system: FontSystem::new_with_locale_and_db(locale, db),
            swash_cache: SwashCache::new(),
            font,
            text_cache: HashMap::with_capacity(64),
        }
    }

    pub fn font(&self) -> &ResolvedFont {
        &self.font
    }

    /// Shape `text` if not cached yet. Returns (width, height).
    fn ensure_shaped(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let family = match &self.font {
            ResolvedFont::Named(name) => Family::Name(name),
            ResolvedFont::SansSerif => Family::SansSerif,
            // cosmic-text cannot shape without a face
            ResolvedFont::Unavailable => return (0.0, 0.0),
        };

        let key = (text.to_string(), (font_size * 10.0).round() as u32);
        if let Some(shaped) = self.text_cache.get(&key) {
            return (shaped.width, shaped.height);
        }

        let metrics = Metrics::new(font_size, font_size * LINE_SPACING);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        let attrs = Attrs::new().family(family);
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;

        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().map(|g| (g.clone(), run.line_y)));
        }

        self.text_cache.insert(
            key,
            ShapedText {
                glyphs,
                width,
                height,
            },
        );
        (width, height)
    }

    pub fn measure(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.ensure_shaped(text, font_size)
    }

    /// Draw text with its top-left corner at (x, y).
    pub fn draw(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        self.ensure_shaped(text, font_size);

        let key = (text.to_string(), (font_size * 10.0).round() as u32);
        let Some(shaped) = self.text_cache.get(&key) else {
            return;
        };

        let c = color.to_color_u8();
        let text_color = CosmicColor::rgba(c.red(), c.green(), c.blue(), c.alpha());

        for (glyph, line_y) in &shaped.glyphs {
            let physical = glyph.physical((x, y + line_y), 1.0);

            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical.cache_key)
            {
                draw_glyph(
                    pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    physical.x + image.placement.left,
                    physical.y - image.placement.top,
                    text_color,
                );
            }
        }
    }

    /// Draw text horizontally centered on `center_x`.
    pub fn draw_centered(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        center_x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let (w, _) = self.measure(text, font_size);
        self.draw(pixmap, text, center_x - w / 2.0, y, font_size, color);
    }

    /// Draw text with its right edge at `right_x`.
    pub fn draw_right(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        right_x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let (w, _) = self.measure(text, font_size);
        self.draw(pixmap, text, right_x - w, y, font_size, color);
    }
}

/// Register `font_path` (if any) and resolve `family` to an installed
/// family name.
fn install_font(
    db: &mut fontdb::Database,
    family: &str,
    font_path: Option<&Path>,
) -> Result<String, RenderError> {
    if let Some(path) = font_path {
        db.load_font_file(path).map_err(|e| RenderError::FontUnavailable {
            family: family.to_string(),
            reason: format!("cannot load font file {}: {e}", path.display()),
        })?;
    }

    db.faces()
        .find_map(|face| installed_family(face, family))
        .ok_or_else(|| RenderError::FontUnavailable {
            family: family.to_string(),
            reason: "no installed face has this family name".to_string(),
        })
}

fn installed_family(face: &fontdb::FaceInfo, family: &str) -> Option<String> {
    face.families
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(family))
        .map(|(name, _)| name.clone())
}

/// Alpha-blend a glyph coverage mask onto the pixmap
fn draw_glyph(
    pixmap: &mut Pixmap,
    mask: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let Some(&coverage) = mask.get((gy as u32 * glyph_width + gx as u32) as usize) else {
                continue;
            };
            if coverage == 0 {
                continue;
            }

            let idx = ((py * pixmap_width + px) * 4) as usize;
            let Some(pixel) = data.get_mut(idx..idx + 4) else {
                continue;
            };

            let src_a = (coverage as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;

            pixel[0] = ((color.r() as u32 * src_a + pixel[0] as u32 * inv_a) / 255) as u8;
            pixel[1] = ((color.g() as u32 * src_a + pixel[1] as u32 * inv_a) / 255) as u8;
            pixel[2] = ((color.b() as u32 * src_a + pixel[2] as u32 * inv_a) / 255) as u8;
            pixel[3] = (src_a + (pixel[3] as u32 * inv_a) / 255) as u8;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Public domain test face whose family name is "Tuffy"
    pub(crate) const TEST_FONT: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/Tuffy.ttf");

    fn ink(pixmap: &Pixmap) -> usize {
        pixmap.pixels().iter().filter(|p| p.alpha() > 0).count()
    }

    #[test]
    fn empty_database_disables_text() {
        let renderer =
            TextRenderer::with_database(fontdb::Database::new(), "Liberation Serif", None);
        assert_eq!(renderer.font(), &ResolvedFont::Unavailable);
    }

    #[test]
    fn unreadable_font_file_is_font_unavailable() {
        let mut db = fontdb::Database::new();
        let err = install_font(&mut db, "Anything", Some(Path::new("/nonexistent/font.ttf")))
            .unwrap_err();
        assert!(
            matches!(err, RenderError::FontUnavailable { ref family, .. } if family == "Anything")
        );
    }

    #[test]
    fn drawing_without_fonts_is_harmless() {
        let mut renderer = TextRenderer::with_database(fontdb::Database::new(), "Nope", None);
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        renderer.draw(&mut pixmap, "Pull #1", 2.0, 2.0, 12.0, Color::BLACK);
        renderer.draw_centered(&mut pixmap, "x", 20.0, 2.0, 12.0, Color::BLACK);
        renderer.draw_right(&mut pixmap, "x", 20.0, 2.0, 12.0, Color::BLACK);

        assert_eq!(renderer.measure("Pull #1", 12.0), (0.0, 0.0));
        assert_eq!(ink(&pixmap), 0);
    }

    #[test]
    fn font_file_with_other_family_falls_back_to_sans_serif() {
        let mut renderer = TextRenderer::with_database(
            fontdb::Database::new(),
            "Liberation Serif",
            Some(Path::new(TEST_FONT)),
        );
        assert_eq!(renderer.font(), &ResolvedFont::SansSerif);

        // The installed face still serves as the fallback
        let (width, height) = renderer.measure("Pull #1", 14.0);
        assert!(width > 0.0 && height > 0.0);

        let mut pixmap = Pixmap::new(80, 30).unwrap();
        renderer.draw(&mut pixmap, "Pull #1", 2.0, 2.0, 14.0, Color::BLACK);
        assert!(ink(&pixmap) > 0);
    }

    #[test]
    fn font_file_with_matching_family_is_used() {
        let renderer = TextRenderer::with_database(
            fontdb::Database::new(),
            "tuffy",
            Some(Path::new(TEST_FONT)),
        );
        assert_eq!(renderer.font(), &ResolvedFont::Named("Tuffy".to_string()));
    }
}
