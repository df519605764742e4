//! Shader program cache
//!
//! Compile-once, reference-by-handle storage for shader programs. Callers
//! register name pairs up front (cheap, no GPU work) and resolve the returned
//! [`ShaderReference`] to a shared program on demand; the compile cost for a
//! distinct name pair is paid exactly once for the cache's lifetime.
//!
//! The cache is an explicit object owned by the renderer, not process-global
//! state: two renderers only share compiled programs if they are deliberately
//! built around the same cache.

use std::collections::HashMap;
use std::rc::Rc;

use crate::render::api::RenderBackend;
use crate::render::shader::{ShaderProgram, ShaderReference};

/// Built-in shader sources shipped with the engine
mod sources {
    pub const DEFAULT_VERT: &str = include_str!("shaders/default.vert");
    pub const DEFAULT_FRAG: &str = include_str!("shaders/default.frag");
    pub const SPRITE_VERT: &str = include_str!("shaders/sprite.vert");
    pub const SPRITE_FRAG: &str = include_str!("shaders/sprite.frag");
    pub const TEXT_VERT: &str = include_str!("shaders/text.vert");
    pub const TEXT_FRAG: &str = include_str!("shaders/text.frag");
    pub const SCREEN_VERT: &str = include_str!("shaders/screen.vert");
    pub const SCREEN_FRAG: &str = include_str!("shaders/screen.frag");
}

/// Registry mapping stage source names to compilable source text
///
/// Populated with the engine's built-in sources; applications add their own
/// stages by name. Requesting a name with no registered source is a fatal
/// configuration defect, not a runtime condition.
#[derive(Debug, Default)]
pub struct ShaderSourceLibrary {
    vertex: HashMap<String, String>,
    fragment: HashMap<String, String>,
}

impl ShaderSourceLibrary {
    /// Create an empty library with no sources registered
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a library pre-populated with the built-in `default`, `sprite`,
    /// `text`, and `screen` stage sources
    pub fn with_builtins() -> Self {
        let mut library = Self::default();
        library.add_vertex_source("default", sources::DEFAULT_VERT);
        library.add_fragment_source("default", sources::DEFAULT_FRAG);
        library.add_vertex_source("sprite", sources::SPRITE_VERT);
        library.add_fragment_source("sprite", sources::SPRITE_FRAG);
        library.add_vertex_source("text", sources::TEXT_VERT);
        library.add_fragment_source("text", sources::TEXT_FRAG);
        library.add_vertex_source("screen", sources::SCREEN_VERT);
        library.add_fragment_source("screen", sources::SCREEN_FRAG);
        library
    }

    /// Register (or replace) a vertex-stage source under a name
    pub fn add_vertex_source(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        debug_assert!(!name.is_empty(), "empty vertex source name");
        self.vertex.insert(name, source.into());
    }

    /// Register (or replace) a fragment-stage source under a name
    pub fn add_fragment_source(&mut self, name: impl Into<String>, source: impl Into<String>) {
        let name = name.into();
        debug_assert!(!name.is_empty(), "empty fragment source name");
        self.fragment.insert(name, source.into());
    }

    pub(crate) fn vertex_source(&self, name: &str) -> Option<&str> {
        self.vertex.get(name).map(String::as_str)
    }

    pub(crate) fn fragment_source(&self, name: &str) -> Option<&str> {
        self.fragment.get(name).map(String::as_str)
    }
}

/// Compile-once cache of shader programs keyed by combined name hash
pub struct ShaderCache {
    sources: ShaderSourceLibrary,
    programs: HashMap<u64, Rc<ShaderProgram>>,
    // Auxiliary hash -> name maps used to resolve a reference back into
    // compilable source on first miss.
    vertex_names: HashMap<u64, String>,
    fragment_names: HashMap<u64, String>,
}

impl ShaderCache {
    /// Create a cache over the given source library
    pub fn new(sources: ShaderSourceLibrary) -> Self {
        Self {
            sources,
            programs: HashMap::new(),
            vertex_names: HashMap::new(),
            fragment_names: HashMap::new(),
        }
    }

    /// Mutable access to the source library, for registering application
    /// shader stages
    pub fn sources_mut(&mut self) -> &mut ShaderSourceLibrary {
        &mut self.sources
    }

    /// Record a name pair and return a reference to it. Does not compile;
    /// registering the same pair twice yields equal references resolving to
    /// the same cache entry.
    pub fn register(&mut self, vertex_name: &str, fragment_name: &str) -> ShaderReference {
        let reference = ShaderReference::new(vertex_name, fragment_name);
        self.vertex_names
            .entry(reference.vertex_hash())
            .or_insert_with(|| vertex_name.to_owned());
        self.fragment_names
            .entry(reference.fragment_hash())
            .or_insert_with(|| fragment_name.to_owned());
        reference
    }

    /// Whether a reference's name pair has been registered with this cache
    pub fn is_registered(&self, reference: ShaderReference) -> bool {
        self.vertex_names.contains_key(&reference.vertex_hash())
            && self.fragment_names.contains_key(&reference.fragment_hash())
    }

    /// Resolve a reference to its shared program, compiling on first miss.
    ///
    /// A cache hit is an O(1) map lookup with no GPU work. On a miss the two
    /// stage names are resolved through the auxiliary maps and the sources
    /// compiled; an unregistered reference or a name with no source is fatal.
    /// A compile failure is reported and cached as a zero-handle program
    /// (using it asserts).
    pub fn get(
        &mut self,
        backend: &mut dyn RenderBackend,
        reference: ShaderReference,
    ) -> Rc<ShaderProgram> {
        if let Some(program) = self.programs.get(&reference.combined_hash()) {
            return Rc::clone(program);
        }

        let vertex_name = self
            .vertex_names
            .get(&reference.vertex_hash())
            .unwrap_or_else(|| {
                panic!(
                    "shader reference with unregistered vertex-stage hash {:#x}",
                    reference.vertex_hash()
                )
            })
            .clone();
        let fragment_name = self
            .fragment_names
            .get(&reference.fragment_hash())
            .unwrap_or_else(|| {
                panic!(
                    "shader reference with unregistered fragment-stage hash {:#x}",
                    reference.fragment_hash()
                )
            })
            .clone();

        let vertex_source = self
            .sources
            .vertex_source(&vertex_name)
            .unwrap_or_else(|| panic!("no vertex shader source named '{vertex_name}'"))
            .to_owned();
        let fragment_source = self
            .sources
            .fragment_source(&fragment_name)
            .unwrap_or_else(|| panic!("no fragment shader source named '{fragment_name}'"))
            .to_owned();

        log::info!("compiling shader program '{vertex_name}/{fragment_name}'");
        let program = Rc::new(ShaderProgram::compile(
            backend,
            &vertex_name,
            &vertex_source,
            &fragment_name,
            &fragment_source,
        ));
        self.programs.insert(reference.combined_hash(), Rc::clone(&program));
        program
    }

    /// Number of compiled programs held by the cache
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether the cache holds no compiled programs
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Bulk-release every compiled program.
    ///
    /// Must be called before the graphics backend is torn down; destroying
    /// cached programs afterwards is undefined behavior on a real context.
    /// Outstanding `Rc<ShaderProgram>` clones survive but their handles are
    /// zeroed, so late use trips the zero-handle assertion.
    pub fn wipe(&mut self, backend: &mut dyn RenderBackend) {
        let count = self.programs.len();
        for (_, program) in self.programs.drain() {
            program.release(backend);
        }
        if count > 0 {
            log::info!("shader cache wiped ({count} programs released)");
        }
    }
}

impl Drop for ShaderCache {
    fn drop(&mut self) {
        // A second panic during unwind would abort and mask the original
        // failure.
        if std::thread::panicking() {
            return;
        }
        debug_assert!(
            self.programs.is_empty(),
            "shader cache dropped while holding {} live programs; wipe() before context teardown",
            self.programs.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    fn cache() -> ShaderCache {
        ShaderCache::new(ShaderSourceLibrary::with_builtins())
    }

    #[test]
    fn same_pair_resolves_to_same_program_instance() {
        let mut backend = HeadlessBackend::new();
        let mut cache = cache();
        let a = cache.register("default", "default");
        let b = cache.register("default", "default");

        let first = cache.get(&mut backend, a);
        let second = cache.get(&mut backend, b);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.handle(), second.handle());

        cache.wipe(&mut backend);
    }

    #[test]
    fn repeated_gets_compile_exactly_once() {
        let mut backend = HeadlessBackend::new();
        let mut cache = cache();
        let reference = cache.register("default", "default");

        for _ in 0..8 {
            let _ = cache.get(&mut backend, reference);
        }
        assert_eq!(backend.counters().programs_compiled, 1);
        assert_eq!(cache.len(), 1);

        cache.wipe(&mut backend);
    }

    #[test]
    fn distinct_pairs_compile_separately() {
        let mut backend = HeadlessBackend::new();
        let mut cache = cache();
        let mesh = cache.register("default", "default");
        let sprite = cache.register("sprite", "sprite");

        let _ = cache.get(&mut backend, mesh);
        let _ = cache.get(&mut backend, sprite);
        assert_eq!(backend.counters().programs_compiled, 2);
        assert_eq!(cache.len(), 2);

        cache.wipe(&mut backend);
    }

    #[test]
    fn register_records_without_compiling() {
        let mut cache = cache();
        let reference = cache.register("default", "default");
        assert!(cache.is_registered(reference));
        assert!(cache.is_empty());
    }

    #[test]
    fn unregistered_reference_is_not_registered() {
        let cache = cache();
        let reference = ShaderReference::new("default", "default");
        assert!(!cache.is_registered(reference));
    }

    #[test]
    #[should_panic(expected = "no vertex shader source named")]
    fn missing_source_is_fatal() {
        let mut backend = HeadlessBackend::new();
        let mut cache = ShaderCache::new(ShaderSourceLibrary::empty());
        let reference = cache.register("nonexistent", "nonexistent");
        let _ = cache.get(&mut backend, reference);
    }

    #[test]
    fn wipe_zeroes_outstanding_program_handles() {
        let mut backend = HeadlessBackend::new();
        let mut cache = cache();
        let reference = cache.register("default", "default");
        let program = cache.get(&mut backend, reference);

        cache.wipe(&mut backend);
        assert!(cache.is_empty());
        assert!(!program.is_usable());
        assert_eq!(backend.live_program_count(), 0);
    }

    #[test]
    #[should_panic(expected = "simulated frame failure")]
    fn unwinding_with_live_programs_does_not_abort() {
        let mut backend = HeadlessBackend::new();
        let mut cache = cache();
        let reference = cache.register("default", "default");
        let _ = cache.get(&mut backend, reference);
        // The cache is dropped mid-unwind here; the teardown assert must not
        // escalate this panic into an abort.
        panic!("simulated frame failure");
    }

    #[test]
    fn failed_compile_is_cached_and_unusable() {
        let mut backend = HeadlessBackend::new();
        let mut library = ShaderSourceLibrary::with_builtins();
        library.add_vertex_source("broken", "");
        let mut cache = ShaderCache::new(library);

        let reference = cache.register("broken", "default");
        let program = cache.get(&mut backend, reference);
        assert!(!program.is_usable());
        // Still only one compile attempt on re-resolve.
        let again = cache.get(&mut backend, reference);
        assert!(Rc::ptr_eq(&program, &again));
        assert_eq!(backend.counters().compile_failures, 1);

        cache.wipe(&mut backend);
    }
}
