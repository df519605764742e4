//! Glyph atlas boundary for screen-space text
//!
//! Font rasterization happens in an external asset loader; what the renderer
//! sees is a [`FontAtlas`]: per-character glyph metrics plus an opaque texture
//! handle per glyph bitmap. The screen-space pass batches draws per distinct
//! character, so layout here produces instance position lists keyed by char
//! rather than one quad per character occurrence.

use std::collections::HashMap;

use crate::foundation::math::Vec2;
use crate::render::api::TextureHandle;

/// Metrics and bitmap handle for a single rasterized glyph
#[derive(Debug, Clone, Copy)]
pub struct GlyphInfo {
    /// Opaque handle to the glyph's bitmap texture
    pub texture: TextureHandle,
    /// Bitmap width in pixels
    pub width: f32,
    /// Bitmap height in pixels
    pub height: f32,
    /// Offset from the pen position to the bitmap's lower-left corner
    pub bearing: Vec2,
    /// Horizontal pen advance to the next character
    pub advance: f32,
}

/// Character-indexed glyph table produced by the (external) font loader
#[derive(Debug, Clone, Default)]
pub struct FontAtlas {
    glyphs: HashMap<char, GlyphInfo>,
    line_height: f32,
}

impl FontAtlas {
    /// Create an empty atlas with the given line height
    pub fn new(line_height: f32) -> Self {
        Self { glyphs: HashMap::new(), line_height }
    }

    /// Register a glyph for a character
    pub fn add_glyph(&mut self, ch: char, glyph: GlyphInfo) {
        debug_assert!(glyph.texture.is_valid() || ch == ' ', "glyph with null texture");
        self.glyphs.insert(ch, glyph);
    }

    /// Look up a character's glyph
    pub fn glyph(&self, ch: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&ch)
    }

    /// Vertical distance between baselines
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Number of registered glyphs
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Lay out a string starting at `origin` and collect instance positions
    /// grouped by character.
    ///
    /// Each entry maps a distinct character to every screen position where it
    /// occurs, ready for one instanced draw per character. Newlines advance
    /// the baseline; characters without a glyph advance the pen by nothing
    /// and are dropped.
    pub fn instance_positions(
        &self,
        text: &str,
        origin: Vec2,
        scale: f32,
    ) -> HashMap<char, Vec<[f32; 2]>> {
        let mut instances: HashMap<char, Vec<[f32; 2]>> = HashMap::new();
        let mut pen = origin;
        for ch in text.chars() {
            if ch == '\n' {
                pen.x = origin.x;
                pen.y -= self.line_height * scale;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                log::trace!("no glyph for {ch:?}, skipped");
                continue;
            };
            if glyph.width > 0.0 && glyph.height > 0.0 {
                instances
                    .entry(ch)
                    .or_default()
                    .push([pen.x + glyph.bearing.x * scale, pen.y + glyph.bearing.y * scale]);
            }
            pen.x += glyph.advance * scale;
        }
        instances
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Atlas covering ASCII letters, digits, and space, with uniform metrics
    pub fn fixture_atlas() -> FontAtlas {
        let mut atlas = FontAtlas::new(16.0);
        let mut next_texture = 100u32;
        for ch in ('a'..='z').chain('A'..='Z').chain('0'..='9') {
            atlas.add_glyph(
                ch,
                GlyphInfo {
                    texture: TextureHandle(next_texture),
                    width: 8.0,
                    height: 12.0,
                    bearing: Vec2::new(0.0, 0.0),
                    advance: 9.0,
                },
            );
            next_texture += 1;
        }
        atlas.add_glyph(
            ' ',
            GlyphInfo {
                texture: TextureHandle::NONE,
                width: 0.0,
                height: 0.0,
                bearing: Vec2::zeros(),
                advance: 5.0,
            },
        );
        atlas
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fixture_atlas;
    use super::*;

    #[test]
    fn repeated_characters_share_one_group() {
        let atlas = fixture_atlas();
        let instances = atlas.instance_positions("hello", Vec2::zeros(), 1.0);
        // Distinct characters: h, e, l, o.
        assert_eq!(instances.len(), 4);
        assert_eq!(instances[&'l'].len(), 2);
        assert_eq!(instances[&'h'].len(), 1);
    }

    #[test]
    fn spaces_advance_without_instances() {
        let atlas = fixture_atlas();
        let instances = atlas.instance_positions("a b", Vec2::zeros(), 1.0);
        assert!(!instances.contains_key(&' '));
        // 'b' sits past 'a' advance plus the space advance.
        assert_eq!(instances[&'b'][0][0], 9.0 + 5.0);
    }

    #[test]
    fn newline_resets_pen_and_drops_baseline() {
        let atlas = fixture_atlas();
        let instances = atlas.instance_positions("a\nb", Vec2::new(10.0, 100.0), 1.0);
        assert_eq!(instances[&'a'][0], [10.0, 100.0]);
        assert_eq!(instances[&'b'][0], [10.0, 100.0 - 16.0]);
    }

    #[test]
    fn scale_multiplies_advances() {
        let atlas = fixture_atlas();
        let instances = atlas.instance_positions("ab", Vec2::zeros(), 2.0);
        assert_eq!(instances[&'b'][0][0], 18.0);
    }
}
