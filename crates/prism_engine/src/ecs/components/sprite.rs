//! Sprite component for the 2D pass

use crate::ecs::Component;
use crate::render::api::TextureHandle;

/// Which sprite dimension is preserved when correcting for the source
/// image's native aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatioLock {
    /// Keep the transform's width, squeeze/stretch height
    Width,
    /// Keep the transform's height, squeeze/stretch width
    Height,
}

/// Textured quad drawn in the 2D pass
#[derive(Debug, Clone, Copy)]
pub struct SpriteComponent {
    /// Sprite texture (opaque asset-loader handle)
    pub texture: TextureHandle,
    /// Native texture width in pixels, for aspect correction
    pub native_width: u32,
    /// Native texture height in pixels, for aspect correction
    pub native_height: u32,
    /// When set, no aspect correction is applied (both factors stay 1.0)
    pub ignore_aspect_ratio: bool,
    /// Which dimension the aspect correction preserves
    pub lock: AspectRatioLock,
    /// Tint color (linear RGBA)
    pub color: [f32; 4],
    /// Inactive sprites are skipped entirely
    pub active: bool,
}

impl Component for SpriteComponent {}

impl SpriteComponent {
    /// Create an active sprite over a texture with known native size
    pub fn new(texture: TextureHandle, native_width: u32, native_height: u32) -> Self {
        Self {
            texture,
            native_width,
            native_height,
            ignore_aspect_ratio: false,
            lock: AspectRatioLock::Height,
            color: [1.0, 1.0, 1.0, 1.0],
            active: true,
        }
    }

    /// The (aspect_ratio, aspect_ratio_reverse) correction factors uploaded
    /// to the sprite shader.
    ///
    /// With `ignore_aspect_ratio` both are 1.0 regardless of the native
    /// dimensions. Otherwise the locked dimension keeps factor 1.0 and the
    /// other is scaled by the native ratio.
    pub fn aspect_factors(&self) -> (f32, f32) {
        if self.ignore_aspect_ratio || self.native_height == 0 || self.native_width == 0 {
            return (1.0, 1.0);
        }
        let ratio = self.native_width as f32 / self.native_height as f32;
        match self.lock {
            AspectRatioLock::Height => (ratio, 1.0),
            AspectRatioLock::Width => (1.0, 1.0 / ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_flag_forces_unit_factors() {
        let mut sprite = SpriteComponent::new(TextureHandle(7), 1920, 1080);
        sprite.ignore_aspect_ratio = true;
        assert_eq!(sprite.aspect_factors(), (1.0, 1.0));
    }

    #[test]
    fn height_lock_scales_width() {
        let sprite = SpriteComponent::new(TextureHandle(7), 200, 100);
        assert_eq!(sprite.aspect_factors(), (2.0, 1.0));
    }

    #[test]
    fn width_lock_scales_height() {
        let mut sprite = SpriteComponent::new(TextureHandle(7), 200, 100);
        sprite.lock = AspectRatioLock::Width;
        assert_eq!(sprite.aspect_factors(), (1.0, 0.5));
    }

    #[test]
    fn degenerate_native_size_is_unit() {
        let sprite = SpriteComponent::new(TextureHandle(7), 0, 100);
        assert_eq!(sprite.aspect_factors(), (1.0, 1.0));
    }
}
