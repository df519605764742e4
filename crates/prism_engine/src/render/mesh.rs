//! GPU-resident meshes and the registry that owns them
//!
//! Components refer to meshes by [`MeshId`] so scene data stays plain; the
//! renderer resolves ids through the [`MeshRegistry`] it owns. Mesh vertex
//! and index buffers are move-only GPU resources (see [`crate::render::buffer`]).

use bytemuck::{Pod, Zeroable};

use crate::render::api::RenderBackend;
use crate::render::buffer::{IndexBuffer, VertexBuffer};
use crate::render::RenderResult;

/// Interleaved vertex layout shared by every pipeline in the engine
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
}

impl Vertex {
    /// Construct a vertex from position/normal/uv triples
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, normal, uv }
    }
}

slotmap::new_key_type! {
    /// Generational key identifying a mesh inside a [`MeshRegistry`]
    pub struct MeshId;
}

/// A mesh with GPU-resident vertex and index buffers
#[derive(Debug)]
pub struct Mesh {
    vertices: VertexBuffer,
    indices: IndexBuffer,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Upload vertex and index data to the backend
    pub fn new(
        backend: &mut dyn RenderBackend,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> RenderResult<Self> {
        debug_assert!(!vertices.is_empty(), "mesh with no vertices");
        debug_assert!(!indices.is_empty(), "mesh with no indices");
        debug_assert!(indices.len() % 3 == 0, "index count not a multiple of 3");
        let vertex_buffer = VertexBuffer::new(backend, bytemuck::cast_slice(vertices))?;
        let index_buffer = IndexBuffer::new(backend, bytemuck::cast_slice(indices))?;
        Ok(Self {
            vertices: vertex_buffer,
            indices: index_buffer,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        })
    }

    /// A unit cube centered at the origin, 8 shared vertices / 12 triangles
    pub fn cube(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        let corners = [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ];
        let vertices: Vec<Vertex> = corners
            .iter()
            .map(|&p| {
                // Shared-corner normals: normalized corner direction.
                let len_sq: f32 = p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
                let inv = 1.0 / len_sq.sqrt();
                Vertex::new(p, [p[0] * inv, p[1] * inv, p[2] * inv], [0.0, 0.0])
            })
            .collect();
        #[rustfmt::skip]
        let indices: [u32; 36] = [
            0, 1, 2, 2, 3, 0, // back
            4, 6, 5, 6, 4, 7, // front
            0, 3, 7, 7, 4, 0, // left
            1, 5, 6, 6, 2, 1, // right
            3, 2, 6, 6, 7, 3, // top
            0, 4, 5, 5, 1, 0, // bottom
        ];
        Self::new(backend, &vertices, &indices)
    }

    /// A unit quad in the XY plane, 4 vertices / 2 triangles, uv in [0, 1]
    pub fn quad(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        let vertices = [
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        let indices = [0u32, 1, 2, 2, 3, 0];
        Self::new(backend, &vertices, &indices)
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Vertex buffer (for draw submission)
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Index buffer (for draw submission)
    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.indices
    }

    /// Release both GPU buffers
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.vertices.destroy(backend);
        self.indices.destroy(backend);
    }
}

/// Owner of every mesh the renderer can draw
///
/// Scene components carry [`MeshId`] values; the registry keeps the GPU
/// resources in one place so teardown is a single wipe before the backend
/// goes away.
#[derive(Default)]
pub struct MeshRegistry {
    meshes: slotmap::SlotMap<MeshId, Mesh>,
}

impl MeshRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a mesh and return its id
    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    /// Look up a mesh; `None` for removed or foreign ids
    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    /// Remove a single mesh and release its GPU buffers
    pub fn remove(&mut self, backend: &mut dyn RenderBackend, id: MeshId) {
        if let Some(mut mesh) = self.meshes.remove(id) {
            mesh.destroy(backend);
        }
    }

    /// Number of registered meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Release every mesh; must run before backend teardown
    pub fn wipe(&mut self, backend: &mut dyn RenderBackend) {
        for (_, mut mesh) in self.meshes.drain() {
            mesh.destroy(backend);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn cube_has_shared_corner_vertices() {
        let mut backend = HeadlessBackend::new();
        let mut mesh = Mesh::cube(&mut backend).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.index_count(), 36);
        mesh.destroy(&mut backend);
    }

    #[test]
    fn registry_round_trip() {
        let mut backend = HeadlessBackend::new();
        let mut registry = MeshRegistry::new();
        let id = registry.add(Mesh::quad(&mut backend).unwrap());
        assert_eq!(registry.get(id).unwrap().index_count(), 6);

        registry.remove(&mut backend, id);
        assert!(registry.get(id).is_none());
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn wipe_releases_all_buffers() {
        let mut backend = HeadlessBackend::new();
        let mut registry = MeshRegistry::new();
        registry.add(Mesh::cube(&mut backend).unwrap());
        registry.add(Mesh::quad(&mut backend).unwrap());
        assert_eq!(backend.live_buffer_count(), 4);

        registry.wipe(&mut backend);
        assert!(registry.is_empty());
        assert_eq!(backend.live_buffer_count(), 0);
    }
}
