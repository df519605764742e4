//! Per-frame shared uniform block
//!
//! A small fixed-layout buffer holding the view/projection matrices and the
//! camera position, shared by every shader program instead of being re-bound
//! per draw call. It is overwritten exactly once per frame, before any draw
//! reads it; GPU-side readers are ordered by the graphics API's command
//! stream, so no engine-level synchronization is needed.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::RenderBackend;
use crate::render::buffer::UniformBuffer;
use crate::render::RenderResult;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameBlockData {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    // vec4 for std140-style alignment; w is unused.
    camera_position: [f32; 4],
}

/// GPU-resident frame uniform block
pub struct FrameUniformBlock {
    buffer: UniformBuffer,
}

impl FrameUniformBlock {
    /// Allocate the block, zero-initialized
    pub fn new(backend: &mut dyn RenderBackend) -> RenderResult<Self> {
        let data = FrameBlockData::zeroed();
        let buffer = UniformBuffer::new(backend, bytemuck::bytes_of(&data))?;
        Ok(Self { buffer })
    }

    /// Overwrite the block with this frame's camera state
    pub fn write(
        &mut self,
        backend: &mut dyn RenderBackend,
        view: &Mat4,
        projection: &Mat4,
        camera_position: Vec3,
    ) {
        let data = FrameBlockData {
            view: (*view).into(),
            projection: (*projection).into(),
            camera_position: [camera_position.x, camera_position.y, camera_position.z, 0.0],
        };
        self.buffer.update(backend, bytemuck::bytes_of(&data));
    }

    /// Release the GPU buffer
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.buffer.destroy(backend);
    }
}
