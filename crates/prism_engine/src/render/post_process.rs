//! Off-screen post-processing target
//!
//! The 3D/2D/screen-space passes draw into this target; a final composition
//! pass samples its color attachment onto the default framebuffer. The
//! renderer checks the tracked viewport size against the target once per
//! frame (not per resize event) so a burst of resizes costs one reallocation.

use crate::render::api::{RenderBackend, RenderTargetHandle, TextureHandle};
use crate::render::RenderResult;

/// Off-screen render target with color and depth/stencil attachments
pub struct PostProcessTarget {
    target: RenderTargetHandle,
    color: TextureHandle,
    depth_stencil: TextureHandle,
    width: u32,
    height: u32,
    bound: bool,
}

impl PostProcessTarget {
    /// Allocate attachments sized to the given viewport
    pub fn new(backend: &mut dyn RenderBackend, width: u32, height: u32) -> RenderResult<Self> {
        let attachments = backend.create_render_target(width, height)?;
        log::info!("post-process target allocated at {width}x{height}");
        Ok(Self {
            target: attachments.target,
            color: attachments.color,
            depth_stencil: attachments.depth_stencil,
            width,
            height,
            bound: false,
        })
    }

    /// Current attachment size
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Color attachment, sampled by the composition pass
    pub fn color_attachment(&self) -> TextureHandle {
        self.color
    }

    /// Whether draws are currently directed at this target
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Destroy and reallocate both attachments at a new size.
    ///
    /// Leaves the target unbound; callers must rebind explicitly. The new
    /// target is allocated before the old one is released, so a failed
    /// allocation keeps the old target alive and retryable.
    pub fn reload(
        &mut self,
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        if self.bound {
            backend.bind_render_target(None);
            self.bound = false;
        }
        let attachments = backend.create_render_target(width, height)?;
        backend.destroy_render_target(self.target);
        self.target = attachments.target;
        self.color = attachments.color;
        self.depth_stencil = attachments.depth_stencil;
        self.width = width;
        self.height = height;
        log::info!("post-process target reallocated at {width}x{height}");
        Ok(())
    }

    /// Direct subsequent draws at this target
    pub fn bind(&mut self, backend: &mut dyn RenderBackend) {
        // Attachments must be live for the whole bound interval.
        assert!(self.target.is_valid(), "bound a destroyed post-process target");
        assert!(self.color.is_valid() && self.depth_stencil.is_valid(),
            "post-process target bound with null attachments");
        backend.bind_render_target(Some(self.target));
        self.bound = true;
    }

    /// Restore the default framebuffer
    pub fn unbind(&mut self, backend: &mut dyn RenderBackend) {
        backend.bind_render_target(None);
        self.bound = false;
    }

    /// Release the target and attachments; must run before backend teardown
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        if self.bound {
            backend.bind_render_target(None);
            self.bound = false;
        }
        if self.target.is_valid() {
            backend.destroy_render_target(self.target);
            self.target = RenderTargetHandle::NONE;
            self.color = TextureHandle::NONE;
            self.depth_stencil = TextureHandle::NONE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn reload_swaps_attachments_and_unbinds() {
        let mut backend = HeadlessBackend::new();
        let mut target = PostProcessTarget::new(&mut backend, 1280, 720).unwrap();
        target.bind(&mut backend);
        let old_color = target.color_attachment();

        target.reload(&mut backend, 1920, 1080).unwrap();
        assert!(!target.is_bound());
        assert_eq!(target.size(), (1920, 1080));
        assert_ne!(target.color_attachment(), old_color);
        assert_eq!(backend.live_target_count(), 1);

        target.destroy(&mut backend);
        assert_eq!(backend.live_target_count(), 0);
    }

    #[test]
    fn failed_reload_keeps_the_old_target_alive() {
        let mut backend = HeadlessBackend::new();
        let mut target = PostProcessTarget::new(&mut backend, 800, 600).unwrap();

        assert!(target.reload(&mut backend, 0, 100).is_err());
        assert_eq!(target.size(), (800, 600));
        assert_eq!(backend.live_target_count(), 1);

        // The old target survives the failure and stays reloadable.
        target.reload(&mut backend, 1024, 768).unwrap();
        assert_eq!(target.size(), (1024, 768));
        assert_eq!(backend.live_target_count(), 1);

        target.destroy(&mut backend);
    }

    #[test]
    #[should_panic(expected = "destroyed post-process target")]
    fn binding_after_destroy_panics() {
        let mut backend = HeadlessBackend::new();
        let mut target = PostProcessTarget::new(&mut backend, 640, 480).unwrap();
        target.destroy(&mut backend);
        target.bind(&mut backend);
    }
}
