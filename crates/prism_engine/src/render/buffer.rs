//! Move-only GPU buffer wrappers
//!
//! Each wrapper owns a single non-shareable backend buffer handle. The types
//! are deliberately not `Clone`: a copy would alias the GPU object and
//! eventually double-free it. Ownership transfers by move; using a destroyed
//! buffer asserts.
//!
//! Release is explicit (`destroy(backend)`) and happens in bulk before the
//! backend is torn down, the same discipline as the shader cache's wipe. A
//! wrapper dropped with a live handle is a leak, logged but not fatal.

use crate::render::api::{BufferHandle, BufferKind, RenderBackend};
use crate::render::RenderResult;

macro_rules! buffer_wrapper {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            handle: BufferHandle,
        }

        impl $name {
            /// Allocate the buffer with initial contents
            pub fn new(backend: &mut dyn RenderBackend, data: &[u8]) -> RenderResult<Self> {
                let handle = backend.create_buffer($kind, data)?;
                Ok(Self { handle })
            }

            /// The underlying handle; asserts the buffer is still alive
            pub fn handle(&self) -> BufferHandle {
                assert!(
                    self.handle.is_valid(),
                    concat!(stringify!($name), " used after destroy")
                );
                self.handle
            }

            /// Replace the buffer contents
            pub fn update(&mut self, backend: &mut dyn RenderBackend, data: &[u8]) {
                backend.update_buffer(self.handle(), data);
            }

            /// Release the GPU buffer; the wrapper is unusable afterwards
            pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
                if self.handle.is_valid() {
                    backend.destroy_buffer(self.handle);
                    self.handle = BufferHandle::NONE;
                }
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                if self.handle.is_valid() {
                    log::debug!(
                        concat!(stringify!($name), " {} leaked (dropped without destroy)"),
                        self.handle.0
                    );
                }
            }
        }
    };
}

buffer_wrapper!(
    /// GPU-resident per-vertex attribute data
    VertexBuffer,
    BufferKind::Vertex
);
buffer_wrapper!(
    /// GPU-resident index data
    IndexBuffer,
    BufferKind::Index
);
buffer_wrapper!(
    /// GPU-resident per-instance attribute data
    InstanceBuffer,
    BufferKind::Instance
);
buffer_wrapper!(
    /// Fixed-layout uniform block storage
    UniformBuffer,
    BufferKind::Uniform
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn destroy_releases_backend_resource() {
        let mut backend = HeadlessBackend::new();
        let mut buffer = VertexBuffer::new(&mut backend, &[0u8; 32]).unwrap();
        assert_eq!(backend.live_buffer_count(), 1);
        buffer.destroy(&mut backend);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    #[should_panic(expected = "used after destroy")]
    fn handle_after_destroy_panics() {
        let mut backend = HeadlessBackend::new();
        let mut buffer = IndexBuffer::new(&mut backend, &[0u8; 12]).unwrap();
        buffer.destroy(&mut backend);
        let _ = buffer.handle();
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut backend = HeadlessBackend::new();
        let mut buffer = UniformBuffer::new(&mut backend, &[0u8; 64]).unwrap();
        buffer.destroy(&mut backend);
        buffer.destroy(&mut backend);
        assert_eq!(backend.live_buffer_count(), 0);
    }
}
