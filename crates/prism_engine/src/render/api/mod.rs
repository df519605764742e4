//! Backend abstraction for the rendering system
//!
//! This module defines the trait a graphics backend must implement to drive
//! the high-level renderer, plus the opaque handle types shared across the
//! boundary. Handles are plain non-zero integers; a zero handle always means
//! "invalid / not yet loaded".

use crate::foundation::math::Mat4;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub u32);

/// Handle to a GPU buffer (vertex, index, instance, or uniform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Handle to a GPU texture
///
/// Produced either by the (external) asset loaders or by render target
/// attachment allocation; the core never inspects texel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Handle to an off-screen render target (framebuffer object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u32);

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            /// The invalid / null handle
            pub const NONE: Self = Self(0);

            /// Whether this handle refers to a live resource
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

impl_handle!(ProgramHandle);
impl_handle!(BufferHandle);
impl_handle!(TextureHandle);
impl_handle!(RenderTargetHandle);

bitflags::bitflags! {
    /// Which framebuffer planes a clear operation touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color attachment
        const COLOR = 1 << 0;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

/// What a buffer is used for; backends may pick memory placement from this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Per-vertex attribute data
    Vertex,
    /// Index data (u32 indices)
    Index,
    /// Per-instance attribute data for instanced draws
    Instance,
    /// Uniform block storage shared across programs
    Uniform,
}

/// Attachments allocated for an off-screen render target
#[derive(Debug, Clone, Copy)]
pub struct RenderTargetAttachments {
    /// The target itself
    pub target: RenderTargetHandle,
    /// Color attachment texture, sampleable by composition passes
    pub color: TextureHandle,
    /// Combined depth/stencil attachment
    pub depth_stencil: TextureHandle,
}

/// Main rendering backend trait
///
/// Abstracts the graphics API underneath the renderer. The graphics context is
/// thread-affine: every method must be called from the one thread that owns
/// the backend. Compilation and draws are synchronous.
pub trait RenderBackend {
    /// Compile and link a shader program from vertex and fragment sources.
    ///
    /// On compile or link failure the diagnostic is logged (with the failing
    /// stage name) and the zero handle is returned; callers that go on to use
    /// the program hit an assertion instead of rendering garbage.
    fn create_program(
        &mut self,
        vertex_name: &str,
        vertex_source: &str,
        fragment_name: &str,
        fragment_source: &str,
    ) -> ProgramHandle;

    /// Release a compiled program
    fn destroy_program(&mut self, program: ProgramHandle);

    /// Make a program current for subsequent uniform uploads and draws
    fn use_program(&mut self, program: ProgramHandle);

    /// Resolve a uniform name to a location on the given program.
    ///
    /// Returns -1 when the program has no uniform of that name. Callers are
    /// expected to memoize the result; resolving is the expensive path.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> i32;

    /// Upload a 4x4 matrix uniform
    fn set_uniform_mat4(&mut self, program: ProgramHandle, location: i32, value: &Mat4);

    /// Upload a vec4 uniform
    fn set_uniform_vec4(&mut self, program: ProgramHandle, location: i32, value: [f32; 4]);

    /// Upload a vec3 uniform
    fn set_uniform_vec3(&mut self, program: ProgramHandle, location: i32, value: [f32; 3]);

    /// Upload a float uniform
    fn set_uniform_f32(&mut self, program: ProgramHandle, location: i32, value: f32);

    /// Upload an integer uniform (also used for sampler slots)
    fn set_uniform_i32(&mut self, program: ProgramHandle, location: i32, value: i32);

    /// Create a GPU buffer with the given initial contents
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Replace the contents of an existing buffer
    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]);

    /// Release a buffer
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Allocate an off-screen render target with color and depth/stencil
    /// attachments of the given size
    fn create_render_target(&mut self, width: u32, height: u32)
        -> BackendResult<RenderTargetAttachments>;

    /// Release a render target and its attachments
    fn destroy_render_target(&mut self, target: RenderTargetHandle);

    /// Redirect subsequent draws to a render target, or to the default
    /// framebuffer when `None`
    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>);

    /// Bind a texture to a sampler slot
    fn bind_texture(&mut self, texture: TextureHandle, slot: u32);

    /// Issue an indexed draw with the current program
    fn draw_indexed(&mut self, vertices: BufferHandle, indices: BufferHandle, index_count: u32);

    /// Issue an instanced indexed draw; per-instance data comes from
    /// `instances`
    fn draw_indexed_instanced(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
        instances: BufferHandle,
        instance_count: u32,
    );

    /// Toggle depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Toggle alpha blending
    fn set_blend(&mut self, enabled: bool);

    /// Toggle wireframe rasterization
    fn set_wireframe(&mut self, enabled: bool);

    /// Set the viewport dimensions
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the currently bound framebuffer
    fn clear(&mut self, color: [f32; 4], flags: ClearFlags);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to the mutable concrete backend type
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
