//! Rendering system
//!
//! The layered draw pipeline and its resource-caching subsystems. The
//! [`renderer::Renderer`] is the single per-frame entry point; everything else
//! here is a subsystem it owns: the [`api::RenderBackend`] boundary, the
//! shader program cache, GPU buffer and mesh wrappers, the post-process
//! target, the camera, lighting, and the glyph-atlas boundary for text.

pub mod api;
pub mod backends;
pub mod buffer;
pub mod camera;
pub mod config;
pub mod lighting;
pub mod mesh;
pub mod post_process;
pub mod renderer;
pub mod shader;
pub mod shader_cache;
pub mod text;
pub mod uniform_block;

pub use api::{
    BufferHandle, BufferKind, ClearFlags, ProgramHandle, RenderBackend, RenderTargetHandle,
    TextureHandle,
};
pub use camera::{Camera, ProjectionMode};
pub use config::{ConfigError, RendererConfig};
pub use lighting::{DirectionalLight, LightingEnvironment, PointLight, MAX_POINT_LIGHTS};
pub use mesh::{Mesh, MeshId, MeshRegistry, Vertex};
pub use renderer::{RenderStats, Renderer};
pub use shader::{ShaderProgram, ShaderReference};
pub use shader_cache::{ShaderCache, ShaderSourceLibrary};
pub use text::{FontAtlas, GlyphInfo};

/// Errors raised by rendering operations
///
/// Fatal conditions (missing shader source, zero-handle use, double-free,
/// pipeline re-entry) are assertions rather than error values; this enum
/// covers the conditions a caller can meaningfully react to.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A shader stage failed to compile or link
    #[error("shader compilation failed: {0}")]
    CompilationFailed(String),
    /// The backend could not allocate a GPU resource
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// A handle did not refer to a live resource
    #[error("invalid handle: {0}")]
    InvalidHandle(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
