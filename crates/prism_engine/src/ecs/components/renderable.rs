//! Mesh renderer and material components

use crate::ecs::Component;
use crate::render::api::TextureHandle;
use crate::render::mesh::MeshId;
use crate::render::shader::ShaderReference;

/// Attaches a GPU mesh and shader to an entity for the 3D pass
#[derive(Debug, Clone, Copy)]
pub struct MeshRendererComponent {
    /// Mesh to draw, resolved through the renderer's registry
    pub mesh: MeshId,
    /// Shader program reference, resolved through the shader cache
    pub shader: ShaderReference,
    /// Inactive entities are skipped entirely: no vertex or draw-call cost
    pub active: bool,
}

impl Component for MeshRendererComponent {}

impl MeshRendererComponent {
    /// Create an active mesh renderer
    pub fn new(mesh: MeshId, shader: ShaderReference) -> Self {
        Self { mesh, shader, active: true }
    }
}

/// Optional surface appearance for the 3D pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialComponent {
    /// Base color multiplier (linear RGBA)
    pub color: [f32; 4],
    /// Albedo texture; the null handle means untextured
    pub texture: TextureHandle,
}

impl Component for MaterialComponent {}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            texture: TextureHandle::NONE,
        }
    }
}

impl MaterialComponent {
    /// Untextured material with the given color
    pub fn from_color(color: [f32; 4]) -> Self {
        Self { color, texture: TextureHandle::NONE }
    }

    /// Textured material with a white base color
    pub fn from_texture(texture: TextureHandle) -> Self {
        Self { color: [1.0, 1.0, 1.0, 1.0], texture }
    }
}
