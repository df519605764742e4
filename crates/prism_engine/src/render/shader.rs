//! Shader references and compiled shader programs
//!
//! A [`ShaderReference`] is a lightweight value identifying a program by the
//! hashes of its two stage source names; it is what components store and what
//! the persistence layer serializes (by name, never by compiled handle). The
//! [`ShaderProgram`] owns the compiled GPU handle plus a memoized uniform
//! location table.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::foundation::math::Mat4;
use crate::render::api::{ProgramHandle, RenderBackend};

/// Hash a shader source name for reference identity
fn hash_name(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

fn combine_hashes(vertex: u64, fragment: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    vertex.hash(&mut hasher);
    fragment.hash(&mut hasher);
    hasher.finish()
}

/// Immutable value identifying a shader program by its source names
///
/// Many references may exist for the same name pair; they all resolve to the
/// same cache entry through the combined hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderReference {
    vertex_hash: u64,
    fragment_hash: u64,
    combined_hash: u64,
}

impl ShaderReference {
    pub(crate) fn new(vertex_name: &str, fragment_name: &str) -> Self {
        debug_assert!(!vertex_name.is_empty(), "empty vertex shader name");
        debug_assert!(!fragment_name.is_empty(), "empty fragment shader name");
        let vertex_hash = hash_name(vertex_name);
        let fragment_hash = hash_name(fragment_name);
        Self {
            vertex_hash,
            fragment_hash,
            combined_hash: combine_hashes(vertex_hash, fragment_hash),
        }
    }

    /// Hash of the vertex-stage source name
    pub fn vertex_hash(&self) -> u64 {
        self.vertex_hash
    }

    /// Hash of the fragment-stage source name
    pub fn fragment_hash(&self) -> u64 {
        self.fragment_hash
    }

    /// Combined hash used as the cache key
    pub fn combined_hash(&self) -> u64 {
        self.combined_hash
    }
}

/// A compiled and linked shader program
///
/// Uniform locations are resolved from the backend exactly once per
/// (program, uniform-string) pair and memoized; the uniform string may carry
/// an array index or struct-member suffix (`u_point_lights[2].color`).
///
/// Programs do not release their GPU handle on drop: the owning cache bulk
/// releases them via `wipe()` before the graphics context goes away. A
/// released (or failed) program has a zero handle, and any attempt to use it
/// is an assertion failure.
pub struct ShaderProgram {
    handle: Cell<ProgramHandle>,
    label: String,
    locations: RefCell<HashMap<String, i32>>,
}

impl ShaderProgram {
    /// Compile and link from stage sources. A failed compile is reported by
    /// the backend and leaves the handle zero; the program object still
    /// exists so the failure surfaces at first use, not silently.
    pub(crate) fn compile(
        backend: &mut dyn RenderBackend,
        vertex_name: &str,
        vertex_source: &str,
        fragment_name: &str,
        fragment_source: &str,
    ) -> Self {
        let handle =
            backend.create_program(vertex_name, vertex_source, fragment_name, fragment_source);
        let label = format!("{vertex_name}/{fragment_name}");
        if handle.is_valid() {
            log::debug!("shader program '{label}' compiled (handle {})", handle.0);
        }
        Self {
            handle: Cell::new(handle),
            label,
            locations: RefCell::new(HashMap::new()),
        }
    }

    /// The compiled program handle (zero if compilation failed or the cache
    /// was wiped)
    pub fn handle(&self) -> ProgramHandle {
        self.handle.get()
    }

    /// Whether this program can be bound and drawn with
    pub fn is_usable(&self) -> bool {
        self.handle.get().is_valid()
    }

    /// Debug label, `vertex_name/fragment_name`
    pub fn label(&self) -> &str {
        &self.label
    }

    fn usable_handle(&self) -> ProgramHandle {
        let handle = self.handle.get();
        assert!(
            handle.is_valid(),
            "shader program '{}' used with a zero handle (failed compile or wiped cache)",
            self.label
        );
        handle
    }

    /// Make this program current on the backend
    pub fn bind(&self, backend: &mut dyn RenderBackend) {
        backend.use_program(self.usable_handle());
    }

    /// Resolve (or recall) the location of a named uniform
    pub fn uniform_location(&self, backend: &mut dyn RenderBackend, name: &str) -> i32 {
        let handle = self.usable_handle();
        if let Some(&location) = self.locations.borrow().get(name) {
            return location;
        }
        let location = backend.uniform_location(handle, name);
        if location < 0 {
            log::warn!("program '{}' has no uniform named '{name}'", self.label);
        }
        self.locations.borrow_mut().insert(name.to_owned(), location);
        location
    }

    /// Upload a matrix uniform by name
    pub fn set_mat4(&self, backend: &mut dyn RenderBackend, name: &str, value: &Mat4) {
        let location = self.uniform_location(backend, name);
        if location >= 0 {
            backend.set_uniform_mat4(self.usable_handle(), location, value);
        }
    }

    /// Upload a vec4 uniform by name
    pub fn set_vec4(&self, backend: &mut dyn RenderBackend, name: &str, value: [f32; 4]) {
        let location = self.uniform_location(backend, name);
        if location >= 0 {
            backend.set_uniform_vec4(self.usable_handle(), location, value);
        }
    }

    /// Upload a vec3 uniform by name
    pub fn set_vec3(&self, backend: &mut dyn RenderBackend, name: &str, value: [f32; 3]) {
        let location = self.uniform_location(backend, name);
        if location >= 0 {
            backend.set_uniform_vec3(self.usable_handle(), location, value);
        }
    }

    /// Upload a float uniform by name
    pub fn set_f32(&self, backend: &mut dyn RenderBackend, name: &str, value: f32) {
        let location = self.uniform_location(backend, name);
        if location >= 0 {
            backend.set_uniform_f32(self.usable_handle(), location, value);
        }
    }

    /// Upload an integer (or sampler slot) uniform by name
    pub fn set_i32(&self, backend: &mut dyn RenderBackend, name: &str, value: i32) {
        let location = self.uniform_location(backend, name);
        if location >= 0 {
            backend.set_uniform_i32(self.usable_handle(), location, value);
        }
    }

    /// Release the GPU program and zero the handle. Called by the cache's
    /// wipe; further use trips the zero-handle assertion.
    pub(crate) fn release(&self, backend: &mut dyn RenderBackend) {
        let handle = self.handle.get();
        if handle.is_valid() {
            backend.destroy_program(handle);
            self.handle.set(ProgramHandle::NONE);
        }
        self.locations.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn references_from_same_names_are_equal() {
        let a = ShaderReference::new("default", "default");
        let b = ShaderReference::new("default", "default");
        assert_eq!(a, b);
        assert_eq!(a.combined_hash(), b.combined_hash());
    }

    #[test]
    fn references_distinguish_stage_order() {
        let a = ShaderReference::new("sprite", "default");
        let b = ShaderReference::new("default", "sprite");
        assert_ne!(a.combined_hash(), b.combined_hash());
    }

    #[test]
    fn uniform_location_is_resolved_once() {
        let mut backend = HeadlessBackend::new();
        let program = ShaderProgram::compile(&mut backend, "a", "vs", "b", "fs");
        let first = program.uniform_location(&mut backend, "u_model");
        let before = backend.counters().uniform_resolutions;
        let second = program.uniform_location(&mut backend, "u_model");
        assert_eq!(first, second);
        assert_eq!(backend.counters().uniform_resolutions, before);
    }

    #[test]
    #[should_panic(expected = "zero handle")]
    fn binding_a_failed_program_panics() {
        let mut backend = HeadlessBackend::new();
        let program = ShaderProgram::compile(&mut backend, "broken", "", "broken", "fs");
        assert!(!program.is_usable());
        program.bind(&mut backend);
    }

    #[test]
    fn release_zeroes_the_handle() {
        let mut backend = HeadlessBackend::new();
        let program = ShaderProgram::compile(&mut backend, "a", "vs", "b", "fs");
        program.release(&mut backend);
        assert!(!program.is_usable());
        assert_eq!(backend.live_program_count(), 0);
    }
}
