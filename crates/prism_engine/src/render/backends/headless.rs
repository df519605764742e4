//! Headless validating backend
//!
//! Implements the full [`RenderBackend`] contract against in-memory state:
//! handles are allocated from a monotonic counter, every resource is tracked
//! from creation to destruction, and misuse that would be undefined behavior
//! on a real GPU (double free, use after free, drawing with an invalid
//! program) panics immediately instead.
//!
//! Uniform uploads and draw calls are recorded so tests can assert on what
//! the pipeline actually submitted.

use std::collections::HashMap;

use crate::foundation::math::Mat4;
use crate::render::api::{
    BackendResult, BufferHandle, BufferKind, ClearFlags, ProgramHandle, RenderBackend,
    RenderTargetAttachments, RenderTargetHandle, TextureHandle,
};
use crate::render::RenderError;

/// Counters accumulated over the backend's lifetime
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendCounters {
    /// Successful program compile+link operations
    pub programs_compiled: u32,
    /// Failed compile attempts (empty source in this backend)
    pub compile_failures: u32,
    /// Uniform name -> location resolutions performed
    pub uniform_resolutions: u32,
    /// Buffers created
    pub buffers_created: u32,
    /// Buffer content updates
    pub buffer_updates: u32,
    /// Render targets created
    pub render_targets_created: u32,
    /// Non-instanced indexed draws
    pub draw_calls: u32,
    /// Instanced indexed draws
    pub instanced_draw_calls: u32,
    /// Framebuffer clears
    pub clears: u32,
}

/// A recorded uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// 4x4 matrix
    Mat4(Mat4),
    /// Four-component vector
    Vec4([f32; 4]),
    /// Three-component vector
    Vec3([f32; 3]),
    /// Scalar float
    F32(f32),
    /// Scalar integer / sampler slot
    I32(i32),
}

/// One recorded draw submission
#[derive(Debug, Clone, Copy)]
pub struct DrawEvent {
    /// Program that was current at submission
    pub program: ProgramHandle,
    /// Number of indices drawn
    pub index_count: u32,
    /// Instances drawn (1 for plain indexed draws)
    pub instance_count: u32,
    /// Depth-test state at submission
    pub depth_test: bool,
    /// Render target the draw went to (`None` = default framebuffer)
    pub target: Option<RenderTargetHandle>,
}

#[derive(Debug)]
struct BufferRecord {
    kind: BufferKind,
    size: usize,
}

#[derive(Debug)]
struct TargetRecord {
    color: TextureHandle,
    depth_stencil: TextureHandle,
    width: u32,
    height: u32,
}

/// Validating in-memory implementation of [`RenderBackend`]
pub struct HeadlessBackend {
    next_handle: u32,
    programs: HashMap<u32, String>,
    buffers: HashMap<u32, BufferRecord>,
    targets: HashMap<u32, TargetRecord>,
    uniform_tables: HashMap<u32, HashMap<String, i32>>,
    uniform_values: HashMap<(u32, i32), UniformValue>,
    current_program: ProgramHandle,
    bound_target: Option<RenderTargetHandle>,
    depth_test: bool,
    blend: bool,
    wireframe: bool,
    viewport: (u32, u32),
    counters: BackendCounters,
    draw_log: Vec<DrawEvent>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            targets: HashMap::new(),
            uniform_tables: HashMap::new(),
            uniform_values: HashMap::new(),
            current_program: ProgramHandle::NONE,
            bound_target: None,
            depth_test: true,
            blend: false,
            wireframe: false,
            viewport: (0, 0),
            counters: BackendCounters::default(),
            draw_log: Vec::new(),
        }
    }

    fn alloc_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn assert_program_live(&self, program: ProgramHandle) {
        assert!(program.is_valid(), "used a program with a zero handle");
        assert!(
            self.programs.contains_key(&program.0),
            "used a destroyed or unknown program handle {}",
            program.0
        );
    }

    fn assert_buffer_live(&self, buffer: BufferHandle, kind: BufferKind) {
        assert!(buffer.is_valid(), "used a buffer with a zero handle");
        let record = self
            .buffers
            .get(&buffer.0)
            .unwrap_or_else(|| panic!("used a destroyed or unknown buffer handle {}", buffer.0));
        assert!(
            record.kind == kind,
            "buffer {} is {:?}, bound as {:?}",
            buffer.0,
            record.kind,
            kind
        );
    }

    /// Lifetime counters
    pub fn counters(&self) -> BackendCounters {
        self.counters
    }

    /// All draws submitted so far, in order
    pub fn draw_log(&self) -> &[DrawEvent] {
        &self.draw_log
    }

    /// Forget recorded draws (counters are kept)
    pub fn clear_draw_log(&mut self) {
        self.draw_log.clear();
    }

    /// Number of live programs
    pub fn live_program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live render targets
    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Attachment size of a live render target
    pub fn target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)> {
        self.targets.get(&target.0).map(|t| (t.width, t.height))
    }

    /// Color and depth/stencil attachments of a live render target
    pub fn target_attachments(
        &self,
        target: RenderTargetHandle,
    ) -> Option<(TextureHandle, TextureHandle)> {
        self.targets.get(&target.0).map(|t| (t.color, t.depth_stencil))
    }

    /// Look up the last value uploaded to a named uniform on a program.
    ///
    /// Returns `None` when the name was never resolved or never written.
    pub fn uniform_value(&self, program: ProgramHandle, name: &str) -> Option<UniformValue> {
        let location = *self.uniform_tables.get(&program.0)?.get(name)?;
        self.uniform_values.get(&(program.0, location)).copied()
    }

    /// Convenience accessor for scalar float uniforms
    pub fn uniform_f32(&self, program: ProgramHandle, name: &str) -> Option<f32> {
        match self.uniform_value(program, name)? {
            UniformValue::F32(value) => Some(value),
            _ => None,
        }
    }

    fn record_uniform(&mut self, program: ProgramHandle, location: i32, value: UniformValue) {
        self.assert_program_live(program);
        debug_assert!(location >= 0, "uniform upload to unresolved location");
        self.uniform_values.insert((program.0, location), value);
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_program(
        &mut self,
        vertex_name: &str,
        vertex_source: &str,
        fragment_name: &str,
        fragment_source: &str,
    ) -> ProgramHandle {
        debug_assert!(!vertex_name.is_empty() && !fragment_name.is_empty(), "empty shader name");

        // Stand-in for real compilation: an empty source is the one thing a
        // headless backend can reject, and it exercises the failure path.
        if vertex_source.trim().is_empty() {
            log::error!("shader compile failed (vertex stage '{vertex_name}'): empty source");
            self.counters.compile_failures += 1;
            return ProgramHandle::NONE;
        }
        if fragment_source.trim().is_empty() {
            log::error!("shader compile failed (fragment stage '{fragment_name}'): empty source");
            self.counters.compile_failures += 1;
            return ProgramHandle::NONE;
        }

        let handle = self.alloc_handle();
        self.programs.insert(handle, format!("{vertex_name}/{fragment_name}"));
        self.uniform_tables.insert(handle, HashMap::new());
        self.counters.programs_compiled += 1;
        log::debug!("compiled program {handle} ({vertex_name}/{fragment_name})");
        ProgramHandle(handle)
    }

    fn destroy_program(&mut self, program: ProgramHandle) {
        assert!(
            self.programs.remove(&program.0).is_some(),
            "destroyed an unknown or already-freed program handle {}",
            program.0
        );
        self.uniform_tables.remove(&program.0);
        self.uniform_values.retain(|(p, _), _| *p != program.0);
        if self.current_program == program {
            self.current_program = ProgramHandle::NONE;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.assert_program_live(program);
        self.current_program = program;
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> i32 {
        self.assert_program_live(program);
        debug_assert!(!name.is_empty(), "empty uniform name");
        self.counters.uniform_resolutions += 1;
        let table = self.uniform_tables.get_mut(&program.0).expect("program table");
        let next = table.len() as i32;
        *table.entry(name.to_owned()).or_insert(next)
    }

    fn set_uniform_mat4(&mut self, program: ProgramHandle, location: i32, value: &Mat4) {
        self.record_uniform(program, location, UniformValue::Mat4(*value));
    }

    fn set_uniform_vec4(&mut self, program: ProgramHandle, location: i32, value: [f32; 4]) {
        self.record_uniform(program, location, UniformValue::Vec4(value));
    }

    fn set_uniform_vec3(&mut self, program: ProgramHandle, location: i32, value: [f32; 3]) {
        self.record_uniform(program, location, UniformValue::Vec3(value));
    }

    fn set_uniform_f32(&mut self, program: ProgramHandle, location: i32, value: f32) {
        self.record_uniform(program, location, UniformValue::F32(value));
    }

    fn set_uniform_i32(&mut self, program: ProgramHandle, location: i32, value: i32) {
        self.record_uniform(program, location, UniformValue::I32(value));
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle> {
        debug_assert!(!data.is_empty(), "created a zero-sized {kind:?} buffer");
        let handle = self.alloc_handle();
        self.buffers.insert(handle, BufferRecord { kind, size: data.len() });
        self.counters.buffers_created += 1;
        Ok(BufferHandle(handle))
    }

    fn update_buffer(&mut self, buffer: BufferHandle, data: &[u8]) {
        assert!(buffer.is_valid(), "updated a buffer with a zero handle");
        let record = self
            .buffers
            .get_mut(&buffer.0)
            .unwrap_or_else(|| panic!("updated a destroyed or unknown buffer handle {}", buffer.0));
        record.size = data.len();
        self.counters.buffer_updates += 1;
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        assert!(
            self.buffers.remove(&buffer.0).is_some(),
            "destroyed an unknown or already-freed buffer handle {}",
            buffer.0
        );
    }

    fn create_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> BackendResult<RenderTargetAttachments> {
        if width == 0 || height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "render target with degenerate size {width}x{height}"
            )));
        }
        let target = self.alloc_handle();
        let color = TextureHandle(self.alloc_handle());
        let depth_stencil = TextureHandle(self.alloc_handle());
        self.targets.insert(target, TargetRecord { color, depth_stencil, width, height });
        self.counters.render_targets_created += 1;
        log::debug!("created render target {target} ({width}x{height})");
        Ok(RenderTargetAttachments { target: RenderTargetHandle(target), color, depth_stencil })
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        assert!(
            self.targets.remove(&target.0).is_some(),
            "destroyed an unknown or already-freed render target handle {}",
            target.0
        );
        if self.bound_target == Some(target) {
            self.bound_target = None;
        }
    }

    fn bind_render_target(&mut self, target: Option<RenderTargetHandle>) {
        if let Some(handle) = target {
            assert!(
                self.targets.contains_key(&handle.0),
                "bound a destroyed or unknown render target handle {}",
                handle.0
            );
        }
        self.bound_target = target;
    }

    fn bind_texture(&mut self, texture: TextureHandle, _slot: u32) {
        // Asset-loader textures are opaque to this backend; only the null
        // handle is rejected.
        assert!(texture.is_valid(), "bound a texture with a zero handle");
    }

    fn draw_indexed(&mut self, vertices: BufferHandle, indices: BufferHandle, index_count: u32) {
        self.assert_program_live(self.current_program);
        self.assert_buffer_live(vertices, BufferKind::Vertex);
        self.assert_buffer_live(indices, BufferKind::Index);
        debug_assert!(index_count > 0, "draw call with zero indices");
        self.counters.draw_calls += 1;
        self.draw_log.push(DrawEvent {
            program: self.current_program,
            index_count,
            instance_count: 1,
            depth_test: self.depth_test,
            target: self.bound_target,
        });
    }

    fn draw_indexed_instanced(
        &mut self,
        vertices: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
        instances: BufferHandle,
        instance_count: u32,
    ) {
        self.assert_program_live(self.current_program);
        self.assert_buffer_live(vertices, BufferKind::Vertex);
        self.assert_buffer_live(indices, BufferKind::Index);
        self.assert_buffer_live(instances, BufferKind::Instance);
        debug_assert!(index_count > 0, "draw call with zero indices");
        debug_assert!(instance_count > 0, "instanced draw with zero instances");
        self.counters.instanced_draw_calls += 1;
        self.draw_log.push(DrawEvent {
            program: self.current_program,
            index_count,
            instance_count,
            depth_test: self.depth_test,
            target: self.bound_target,
        });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self, _color: [f32; 4], flags: ClearFlags) {
        debug_assert!(!flags.is_empty(), "clear with no planes selected");
        self.counters.clears += 1;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_fails_compilation_with_zero_handle() {
        let mut backend = HeadlessBackend::new();
        let program = backend.create_program("default", "", "default", "void main() {}");
        assert!(!program.is_valid());
        assert_eq!(backend.counters().compile_failures, 1);
        assert_eq!(backend.counters().programs_compiled, 0);
    }

    #[test]
    fn uniform_locations_are_stable_per_name() {
        let mut backend = HeadlessBackend::new();
        let program = backend.create_program("a", "vs", "b", "fs");
        let first = backend.uniform_location(program, "u_model");
        let second = backend.uniform_location(program, "u_view");
        assert_ne!(first, second);
        assert_eq!(backend.uniform_location(program, "u_model"), first);
    }

    #[test]
    #[should_panic(expected = "already-freed buffer")]
    fn double_free_is_detected() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(BufferKind::Vertex, &[0u8; 16]).unwrap();
        backend.destroy_buffer(buffer);
        backend.destroy_buffer(buffer);
    }

    #[test]
    #[should_panic(expected = "zero handle")]
    fn drawing_without_a_program_panics() {
        let mut backend = HeadlessBackend::new();
        let vertices = backend.create_buffer(BufferKind::Vertex, &[0u8; 16]).unwrap();
        let indices = backend.create_buffer(BufferKind::Index, &[0u8; 12]).unwrap();
        backend.draw_indexed(vertices, indices, 3);
    }

    #[test]
    fn render_target_reports_attachment_size() {
        let mut backend = HeadlessBackend::new();
        let attachments = backend.create_render_target(640, 480).unwrap();
        assert!(attachments.color.is_valid());
        assert!(attachments.depth_stencil.is_valid());
        assert_eq!(backend.target_size(attachments.target), Some((640, 480)));
        assert_eq!(
            backend.target_attachments(attachments.target),
            Some((attachments.color, attachments.depth_stencil))
        );
    }

    #[test]
    fn degenerate_render_target_is_rejected() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.create_render_target(0, 480).is_err());
    }
}
