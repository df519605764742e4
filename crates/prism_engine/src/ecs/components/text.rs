//! Screen-space text component

use std::rc::Rc;

use crate::ecs::Component;
use crate::render::text::FontAtlas;

/// Screen-space text drawn in the screen-space pass
///
/// The entity's transform supplies the screen position (x/y of the
/// transform's position, in viewport pixels); glyph size comes from the atlas
/// scaled by `scale`. Empty text or zero scale skips the entity.
#[derive(Clone)]
pub struct TextComponent {
    /// The string to draw
    pub text: String,
    /// Glyph atlas produced by the (external) font loader
    pub font: Rc<FontAtlas>,
    /// Uniform glyph scale factor
    pub scale: f32,
    /// Text color (linear RGBA)
    pub color: [f32; 4],
    /// Inactive text is skipped entirely
    pub active: bool,
}

impl Component for TextComponent {}

impl TextComponent {
    /// Create active white text at scale 1.0
    pub fn new(text: impl Into<String>, font: Rc<FontAtlas>) -> Self {
        Self {
            text: text.into(),
            font,
            scale: 1.0,
            color: [1.0, 1.0, 1.0, 1.0],
            active: true,
        }
    }
}
