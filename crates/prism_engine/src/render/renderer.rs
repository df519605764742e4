//! Top-level renderer and per-frame draw pipeline
//!
//! The [`Renderer`] owns every GPU-facing subsystem: the backend, the shader
//! cache, the mesh registry, the post-process target, the shared frame uniform
//! block, the 2D sprite quad, and the text pass's glyph quad and instance
//! buffer. `draw_entities` runs the fixed pipeline once per frame:
//!
//! 1. 3D pass over {mesh renderer, transform} entities,
//! 2. 2D pass over {sprite, transform} entities,
//! 3. screen-space pass over {text, transform} entities,
//! 4. composition of the post-process target onto the default framebuffer.
//!
//! The fixed order is what layers sprites and text over 3D geometry;
//! composition reads the accumulated target and must always run last.

use std::collections::HashSet;
use std::rc::Rc;

use crate::ecs::components::{
    MaterialComponent, MeshRendererComponent, SpriteComponent, TextComponent, TransformComponent,
};
use crate::ecs::World;
use crate::foundation::math::{Mat4, Mat4Ext, Vec2};
use crate::foundation::time::Stopwatch;
use crate::render::api::{ClearFlags, RenderBackend};
use crate::render::buffer::{IndexBuffer, InstanceBuffer, VertexBuffer};
use crate::render::camera::Camera;
use crate::render::config::RendererConfig;
use crate::render::lighting::LightingEnvironment;
use crate::render::mesh::{Mesh, MeshId, MeshRegistry, Vertex};
use crate::render::post_process::PostProcessTarget;
use crate::render::shader::{ShaderProgram, ShaderReference};
use crate::render::shader_cache::{ShaderCache, ShaderSourceLibrary};
use crate::render::uniform_block::FrameUniformBlock;
use crate::render::RenderResult;

/// Per-frame counters and pass durations
///
/// Zeroed at the start of every `draw_entities` call and accumulated during
/// that frame only; read by diagnostic overlays afterwards. Never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    /// Entities drawn by the 3D pass
    pub entities_3d: u32,
    /// Vertices submitted by the 3D pass
    pub vertices_3d: u32,
    /// Draw calls issued by the 3D pass
    pub draw_calls_3d: u32,
    /// Sprites drawn by the 2D pass
    pub entities_2d: u32,
    /// Vertices submitted by the 2D pass
    pub vertices_2d: u32,
    /// Draw calls issued by the 2D pass
    pub draw_calls_2d: u32,
    /// Text entities drawn by the screen-space pass
    pub entities_text: u32,
    /// Glyph instances submitted by the screen-space pass
    pub glyph_instances: u32,
    /// Draw calls issued by the screen-space pass (one per distinct glyph)
    pub draw_calls_text: u32,
    /// 3D pass duration in milliseconds
    pub pass_3d_ms: f32,
    /// 2D pass duration in milliseconds
    pub pass_2d_ms: f32,
    /// Screen-space pass duration in milliseconds
    pub pass_text_ms: f32,
}

/// Top-level draw orchestrator
pub struct Renderer {
    backend: Box<dyn RenderBackend>,
    config: RendererConfig,
    shader_cache: ShaderCache,
    meshes: MeshRegistry,
    post_target: PostProcessTarget,
    frame_block: FrameUniformBlock,
    sprite_quad: Mesh,
    glyph_vertices: VertexBuffer,
    glyph_indices: IndexBuffer,
    glyph_instances: InstanceBuffer,
    lighting: LightingEnvironment,
    // Pipeline-internal programs, compiled outside the shader cache so the
    // cache only ever holds application-registered pairs.
    sprite_program: Rc<ShaderProgram>,
    text_program: Rc<ShaderProgram>,
    screen_program: Rc<ShaderProgram>,
    wireframe: bool,
    blend: bool,
    depth_test: bool,
    post_process: bool,
    stats: RenderStats,
    in_frame: bool,
    // Programs that already received frame-constant uniforms this frame,
    // keyed by combined reference hash.
    programs_updated: HashSet<u64>,
}

impl Renderer {
    /// Build a renderer over a backend with the built-in shader sources.
    ///
    /// Allocates the post-process target at the initial viewport size, the
    /// frame uniform block, the shared sprite quad, and the glyph quad with
    /// its instance buffer, and applies the configured initial raster state.
    pub fn new(
        mut backend: Box<dyn RenderBackend>,
        config: RendererConfig,
        viewport: (u32, u32),
    ) -> RenderResult<Self> {
        let sources = ShaderSourceLibrary::with_builtins();
        let sprite_program = pipeline_program(backend.as_mut(), &sources, "sprite");
        let text_program = pipeline_program(backend.as_mut(), &sources, "text");
        let screen_program = pipeline_program(backend.as_mut(), &sources, "screen");
        let shader_cache = ShaderCache::new(sources);

        let post_target = PostProcessTarget::new(backend.as_mut(), viewport.0, viewport.1)?;
        let frame_block = FrameUniformBlock::new(backend.as_mut())?;
        let sprite_quad = Mesh::quad(backend.as_mut())?;

        let glyph_vertices =
            VertexBuffer::new(backend.as_mut(), bytemuck::cast_slice(&unit_glyph_quad()))?;
        let glyph_indices =
            IndexBuffer::new(backend.as_mut(), bytemuck::cast_slice(&GLYPH_INDICES))?;
        // Placeholder contents; rewritten per distinct glyph before each draw.
        let glyph_instances =
            InstanceBuffer::new(backend.as_mut(), bytemuck::cast_slice(&[[0.0f32, 0.0]]))?;

        backend.set_depth_test(config.depth_test);
        backend.set_blend(config.blend);
        backend.set_wireframe(config.wireframe);

        log::info!(
            "renderer initialized at {}x{} (post-processing {})",
            viewport.0,
            viewport.1,
            if config.post_process { "on" } else { "off" }
        );

        Ok(Self {
            wireframe: config.wireframe,
            blend: config.blend,
            depth_test: config.depth_test,
            post_process: config.post_process,
            backend,
            config,
            shader_cache,
            meshes: MeshRegistry::new(),
            post_target,
            frame_block,
            sprite_quad,
            glyph_vertices,
            glyph_indices,
            glyph_instances,
            lighting: LightingEnvironment::new(),
            sprite_program,
            text_program,
            screen_program,
            stats: RenderStats::default(),
            in_frame: false,
            programs_updated: HashSet::new(),
        })
    }

    /// Draw the whole scene for one frame.
    ///
    /// Statistics reset, the coalesced post-target size check, the clear, and
    /// the frame uniform write all happen before the first pass; then the 3D,
    /// 2D, and screen-space passes run in fixed order, followed by
    /// composition. Re-entering while a frame is in flight is an assertion
    /// failure.
    pub fn draw_entities(&mut self, world: &World, camera: &Camera, viewport: (u32, u32)) {
        assert!(!self.in_frame, "draw_entities re-entered within a frame");
        self.in_frame = true;
        debug_assert!(viewport.0 > 0 && viewport.1 > 0, "degenerate viewport");

        self.stats = RenderStats::default();
        self.programs_updated.clear();
        self.backend.set_viewport(viewport.0, viewport.1);

        // One size check per frame; a burst of resize events between frames
        // costs a single reallocation.
        let mut compose = self.post_process;
        if compose && self.post_target.size() != viewport {
            if let Err(err) = self.post_target.reload(self.backend.as_mut(), viewport.0, viewport.1)
            {
                log::error!("post-process target reload failed: {err}; drawing direct");
                compose = false;
            }
        }
        if compose {
            self.post_target.bind(self.backend.as_mut());
        }

        self.backend
            .clear(self.config.clear_color, ClearFlags::COLOR | ClearFlags::DEPTH);

        let view = camera.view_matrix();
        let projection = camera.projection_matrix(viewport);
        self.frame_block
            .write(self.backend.as_mut(), &view, &projection, camera.position);

        self.pass_3d(world, camera, &view, &projection);
        self.pass_2d(world, &view, &projection);
        self.pass_text(world, viewport);

        if compose {
            self.compose();
        }

        self.in_frame = false;
    }

    fn pass_3d(&mut self, world: &World, camera: &Camera, view: &Mat4, projection: &Mat4) {
        let watch = Stopwatch::start_new();

        for entity in world.entities() {
            let Some(renderable) = world.get_component::<MeshRendererComponent>(entity) else {
                continue;
            };
            let Some(transform) = world.get_component::<TransformComponent>(entity) else {
                continue;
            };
            if !renderable.active {
                continue;
            }
            let Some(mesh) = self.meshes.get(renderable.mesh) else {
                log::warn!("entity {entity:?} references a removed mesh, skipped");
                continue;
            };
            let (vertex_count, index_count) = (mesh.vertex_count(), mesh.index_count());
            let (vertices, indices) = (mesh.vertex_buffer().handle(), mesh.index_buffer().handle());

            let program = self.shader_cache.get(self.backend.as_mut(), renderable.shader);
            program.bind(self.backend.as_mut());
            if self.programs_updated.insert(renderable.shader.combined_hash()) {
                program.set_mat4(self.backend.as_mut(), "u_view", view);
                program.set_mat4(self.backend.as_mut(), "u_projection", projection);
                program.set_vec3(self.backend.as_mut(), "u_camera_pos", camera.position.into());
                self.lighting.upload(self.backend.as_mut(), &program);
            }

            program.set_mat4(self.backend.as_mut(), "u_model", &transform.to_matrix());
            match world.get_component::<MaterialComponent>(entity) {
                Some(material) => {
                    program.set_vec4(self.backend.as_mut(), "u_color", material.color);
                    if material.texture.is_valid() {
                        self.backend.bind_texture(material.texture, 0);
                        program.set_i32(self.backend.as_mut(), "u_texture", 0);
                        program.set_i32(self.backend.as_mut(), "u_use_texture", 1);
                    } else {
                        program.set_i32(self.backend.as_mut(), "u_use_texture", 0);
                    }
                }
                None => {
                    program.set_vec4(self.backend.as_mut(), "u_color", [1.0, 1.0, 1.0, 1.0]);
                    program.set_i32(self.backend.as_mut(), "u_use_texture", 0);
                }
            }

            self.backend.draw_indexed(vertices, indices, index_count);
            self.stats.entities_3d += 1;
            self.stats.vertices_3d += vertex_count;
            self.stats.draw_calls_3d += 1;
        }

        self.stats.pass_3d_ms = watch.elapsed_millis();
    }

    fn pass_2d(&mut self, world: &World, view: &Mat4, projection: &Mat4) {
        let watch = Stopwatch::start_new();

        // Model matrices for the whole batch are derived before any GPU state
        // changes; each derivation is pure and independent.
        let batch: Vec<(Mat4, SpriteComponent)> = world
            .entities()
            .filter_map(|entity| {
                let sprite = world.get_component::<SpriteComponent>(entity)?;
                let transform = world.get_component::<TransformComponent>(entity)?;
                sprite.active.then(|| (transform.to_matrix(), *sprite))
            })
            .collect();
        if batch.is_empty() {
            self.stats.pass_2d_ms = watch.elapsed_millis();
            return;
        }

        let program = Rc::clone(&self.sprite_program);
        program.bind(self.backend.as_mut());
        program.set_mat4(self.backend.as_mut(), "u_view", view);
        program.set_mat4(self.backend.as_mut(), "u_projection", projection);
        program.set_i32(self.backend.as_mut(), "u_texture", 0);

        let vertices = self.sprite_quad.vertex_buffer().handle();
        let indices = self.sprite_quad.index_buffer().handle();
        for (model, sprite) in &batch {
            let (aspect, aspect_reverse) = sprite.aspect_factors();
            program.set_mat4(self.backend.as_mut(), "u_model", model);
            program.set_f32(self.backend.as_mut(), "u_aspect_ratio", aspect);
            program.set_f32(self.backend.as_mut(), "u_aspect_ratio_reverse", aspect_reverse);
            program.set_vec4(self.backend.as_mut(), "u_color", sprite.color);
            self.backend.bind_texture(sprite.texture, 0);

            self.backend
                .draw_indexed(vertices, indices, self.sprite_quad.index_count());
            self.stats.entities_2d += 1;
            self.stats.vertices_2d += self.sprite_quad.vertex_count();
            self.stats.draw_calls_2d += 1;
        }

        self.stats.pass_2d_ms = watch.elapsed_millis();
    }

    fn pass_text(&mut self, world: &World, viewport: (u32, u32)) {
        let watch = Stopwatch::start_new();

        let mut pass_started = false;
        for entity in world.entities() {
            let Some(text) = world.get_component::<TextComponent>(entity) else {
                continue;
            };
            let Some(transform) = world.get_component::<TransformComponent>(entity) else {
                continue;
            };
            if !text.active || text.text.is_empty() || text.scale <= 0.0 {
                continue;
            }

            let program = Rc::clone(&self.text_program);
            program.bind(self.backend.as_mut());
            if !pass_started {
                // Screen-space layout works in viewport pixels.
                let ortho =
                    Mat4::orthographic_corner(viewport.0 as f32, viewport.1 as f32, 0.0, 1.0);
                program.set_mat4(self.backend.as_mut(), "u_projection", &ortho);
                program.set_i32(self.backend.as_mut(), "u_glyph", 0);
                pass_started = true;
            }
            program.set_f32(self.backend.as_mut(), "u_scale", text.scale);
            program.set_vec4(self.backend.as_mut(), "u_color", text.color);

            let origin = Vec2::new(transform.position.x, transform.position.y);
            let groups = text.font.instance_positions(&text.text, origin, text.scale);
            self.stats.entities_text += 1;

            // One instanced draw per distinct character bounds draw-call count
            // by alphabet size rather than string length.
            for (ch, positions) in &groups {
                let Some(glyph) = text.font.glyph(*ch) else { continue };
                self.glyph_vertices.update(
                    self.backend.as_mut(),
                    bytemuck::cast_slice(&glyph_quad(glyph.width, glyph.height)),
                );
                self.glyph_instances
                    .update(self.backend.as_mut(), bytemuck::cast_slice(positions));
                self.backend.bind_texture(glyph.texture, 0);

                self.backend.draw_indexed_instanced(
                    self.glyph_vertices.handle(),
                    self.glyph_indices.handle(),
                    GLYPH_INDICES.len() as u32,
                    self.glyph_instances.handle(),
                    positions.len() as u32,
                );
                self.stats.glyph_instances += positions.len() as u32;
                self.stats.draw_calls_text += 1;
            }
        }

        self.stats.pass_text_ms = watch.elapsed_millis();
    }

    /// Final pass: sample the post-process color attachment onto the default
    /// framebuffer through the full-screen shader, with depth testing off for
    /// this single draw.
    fn compose(&mut self) {
        self.post_target.unbind(self.backend.as_mut());
        self.backend.set_depth_test(false);

        let program = Rc::clone(&self.screen_program);
        program.bind(self.backend.as_mut());
        program.set_i32(self.backend.as_mut(), "u_scene", 0);
        self.backend.bind_texture(self.post_target.color_attachment(), 0);
        self.backend.draw_indexed(
            self.sprite_quad.vertex_buffer().handle(),
            self.sprite_quad.index_buffer().handle(),
            self.sprite_quad.index_count(),
        );

        self.backend.set_depth_test(self.depth_test);
    }

    /// Snapshot of the last completed frame's statistics
    pub fn rendering_statistics(&self) -> RenderStats {
        self.stats
    }

    /// Whether wireframe rasterization is active
    pub fn is_wireframe_enabled(&self) -> bool {
        self.wireframe
    }

    /// Flip wireframe rasterization
    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
        self.backend.set_wireframe(self.wireframe);
    }

    /// Enable or disable alpha blending
    pub fn opt_blend(&mut self, enabled: bool) {
        self.blend = enabled;
        self.backend.set_blend(enabled);
    }

    /// Enable or disable depth testing
    pub fn opt_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.backend.set_depth_test(enabled);
    }

    /// Enable or disable post-processing composition
    pub fn opt_post_process(&mut self, enabled: bool) {
        self.post_process = enabled;
    }

    /// Register a shader name pair with the cache (no compilation)
    pub fn register_shader(&mut self, vertex_name: &str, fragment_name: &str) -> ShaderReference {
        self.shader_cache.register(vertex_name, fragment_name)
    }

    /// Resolve a reference to its shared program, compiling on first miss
    pub fn get_shader(&mut self, reference: ShaderReference) -> Rc<ShaderProgram> {
        self.shader_cache.get(self.backend.as_mut(), reference)
    }

    /// Whether a reference's name pair is known to the cache
    pub fn is_shader_registered(&self, reference: ShaderReference) -> bool {
        self.shader_cache.is_registered(reference)
    }

    /// Number of compiled programs in the cache
    pub fn shader_cache_len(&self) -> usize {
        self.shader_cache.len()
    }

    /// Bulk-release every compiled program; they recompile on next use.
    ///
    /// Outstanding program clones have their handles zeroed, so using one
    /// afterwards asserts.
    pub fn wipe_shaders(&mut self) {
        self.shader_cache.wipe(self.backend.as_mut());
    }

    /// Register an application vertex-stage shader source
    pub fn add_vertex_source(&mut self, name: &str, source: &str) {
        self.shader_cache.sources_mut().add_vertex_source(name, source);
    }

    /// Register an application fragment-stage shader source
    pub fn add_fragment_source(&mut self, name: &str, source: &str) {
        self.shader_cache.sources_mut().add_fragment_source(name, source);
    }

    /// Upload a mesh and take ownership of its GPU buffers
    pub fn add_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> RenderResult<MeshId> {
        let mesh = Mesh::new(self.backend.as_mut(), vertices, indices)?;
        Ok(self.meshes.add(mesh))
    }

    /// Upload the built-in unit cube
    pub fn create_cube(&mut self) -> RenderResult<MeshId> {
        let mesh = Mesh::cube(self.backend.as_mut())?;
        Ok(self.meshes.add(mesh))
    }

    /// Upload the built-in unit quad
    pub fn create_quad(&mut self) -> RenderResult<MeshId> {
        let mesh = Mesh::quad(self.backend.as_mut())?;
        Ok(self.meshes.add(mesh))
    }

    /// Remove a mesh and release its GPU buffers
    pub fn remove_mesh(&mut self, id: MeshId) {
        self.meshes.remove(self.backend.as_mut(), id);
    }

    /// The scene lighting environment
    pub fn lighting(&self) -> &LightingEnvironment {
        &self.lighting
    }

    /// Mutable lighting environment; only mutate between frames
    pub fn lighting_mut(&mut self) -> &mut LightingEnvironment {
        &mut self.lighting
    }

    /// The underlying backend, for instrumented-backend inspection
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Release every GPU resource, in dependency order, while the backend is
    /// still alive. Must be called before the renderer is dropped.
    pub fn shutdown(&mut self) {
        assert!(!self.in_frame, "shutdown during draw_entities");
        let backend = self.backend.as_mut();
        self.shader_cache.wipe(backend);
        self.sprite_program.release(backend);
        self.text_program.release(backend);
        self.screen_program.release(backend);
        self.meshes.wipe(backend);
        self.post_target.destroy(backend);
        self.frame_block.destroy(backend);
        self.sprite_quad.destroy(backend);
        self.glyph_vertices.destroy(backend);
        self.glyph_indices.destroy(backend);
        self.glyph_instances.destroy(backend);
        log::info!("renderer shut down");
    }
}

/// Compile one of the engine's built-in programs directly, bypassing the
/// cache. A missing built-in source is a packaging defect, so it is fatal.
fn pipeline_program(
    backend: &mut dyn RenderBackend,
    sources: &ShaderSourceLibrary,
    name: &str,
) -> Rc<ShaderProgram> {
    let vertex = sources
        .vertex_source(name)
        .unwrap_or_else(|| panic!("no vertex shader source named '{name}'"));
    let fragment = sources
        .fragment_source(name)
        .unwrap_or_else(|| panic!("no fragment shader source named '{name}'"));
    Rc::new(ShaderProgram::compile(backend, name, vertex, name, fragment))
}

const GLYPH_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn glyph_quad(width: f32, height: f32) -> [Vertex; 4] {
    [
        Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        Vertex::new([width, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
        Vertex::new([width, height, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
        Vertex::new([0.0, height, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    ]
}

fn unit_glyph_quad() -> [Vertex; 4] {
    glyph_quad(1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::TextureHandle;
    use crate::render::backends::HeadlessBackend;
    use crate::render::text::test_support::fixture_atlas;

    const VIEWPORT: (u32, u32) = (1280, 720);

    fn renderer() -> Renderer {
        Renderer::new(
            Box::new(HeadlessBackend::new()),
            RendererConfig::default(),
            VIEWPORT,
        )
        .unwrap()
    }

    fn headless(renderer: &Renderer) -> &HeadlessBackend {
        renderer.backend().as_any().downcast_ref().unwrap()
    }

    fn cube_scene(renderer: &mut Renderer) -> World {
        let mut world = World::new();
        let mesh = renderer.create_cube().unwrap();
        let shader = renderer.register_shader("default", "default");
        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::identity());
        world.add_component(entity, MeshRendererComponent::new(mesh, shader));
        world
    }

    #[test]
    fn end_to_end_cube_frame() {
        let mut renderer = renderer();
        let world = cube_scene(&mut renderer);
        let camera = Camera::default();

        renderer.draw_entities(&world, &camera, VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_3d, 1);
        assert_eq!(stats.vertices_3d, 8);
        assert_eq!(stats.draw_calls_3d, 1);
        assert_eq!(renderer.shader_cache_len(), 1);

        renderer.shutdown();
    }

    #[test]
    fn statistics_do_not_carry_over() {
        let mut renderer = renderer();
        let world = cube_scene(&mut renderer);
        let camera = Camera::default();

        renderer.draw_entities(&world, &camera, VIEWPORT);
        assert_eq!(renderer.rendering_statistics().entities_3d, 1);

        let empty = World::new();
        renderer.draw_entities(&empty, &camera, VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_3d, 0);
        assert_eq!(stats.vertices_3d, 0);
        assert_eq!(stats.draw_calls_3d, 0);
        assert_eq!(stats.entities_2d, 0);
        assert_eq!(stats.draw_calls_text, 0);

        renderer.shutdown();
    }

    #[test]
    fn inactive_entities_cost_nothing() {
        let mut renderer = renderer();
        let mut world = cube_scene(&mut renderer);

        let mesh = renderer.create_cube().unwrap();
        let shader = renderer.register_shader("default", "default");
        let dormant = world.create_entity();
        world.add_component(dormant, TransformComponent::identity());
        let mut component = MeshRendererComponent::new(mesh, shader);
        component.active = false;
        world.add_component(dormant, component);

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_3d, 1);
        assert_eq!(stats.vertices_3d, 8);
        assert_eq!(stats.draw_calls_3d, 1);

        renderer.shutdown();
    }

    #[test]
    fn aspect_lock_ignore_uploads_unit_factors() {
        let mut renderer = renderer();
        let mut world = World::new();
        let entity = world.create_entity();
        let mut sprite = SpriteComponent::new(TextureHandle(42), 1920, 1080);
        sprite.ignore_aspect_ratio = true;
        world.add_component(entity, TransformComponent::identity());
        world.add_component(entity, sprite);

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        assert_eq!(renderer.rendering_statistics().entities_2d, 1);

        let program = renderer.sprite_program.handle();
        let backend = headless(&renderer);
        assert_eq!(backend.uniform_f32(program, "u_aspect_ratio"), Some(1.0));
        assert_eq!(backend.uniform_f32(program, "u_aspect_ratio_reverse"), Some(1.0));

        renderer.shutdown();
    }

    #[test]
    fn pipeline_programs_stay_out_of_the_shader_cache() {
        let mut renderer = renderer();
        let mut world = cube_scene(&mut renderer);

        let sprite = world.create_entity();
        world.add_component(sprite, TransformComponent::identity());
        world.add_component(sprite, SpriteComponent::new(TextureHandle(7), 256, 256));

        let label = world.create_entity();
        world.add_component(label, TransformComponent::identity());
        world.add_component(label, TextComponent::new("hi", Rc::new(fixture_atlas())));

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_3d, 1);
        assert_eq!(stats.entities_2d, 1);
        assert_eq!(stats.entities_text, 1);
        // Only the application's registered pair occupies the cache; the
        // sprite, text, and screen programs live alongside it.
        assert_eq!(renderer.shader_cache_len(), 1);

        renderer.shutdown();
    }

    #[test]
    fn viewport_change_reallocates_target_once() {
        let mut renderer = renderer();
        let world = World::new();
        let camera = Camera::default();

        renderer.draw_entities(&world, &camera, VIEWPORT);
        assert_eq!(headless(&renderer).counters().render_targets_created, 1);

        // Two frames at the new size: one reallocation, not two.
        renderer.draw_entities(&world, &camera, (1920, 1080));
        renderer.draw_entities(&world, &camera, (1920, 1080));
        let backend = headless(&renderer);
        assert_eq!(backend.counters().render_targets_created, 2);
        assert_eq!(renderer.post_target.size(), (1920, 1080));

        renderer.shutdown();
    }

    #[test]
    fn text_batches_one_instanced_draw_per_distinct_glyph() {
        let mut renderer = renderer();
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(
            entity,
            TransformComponent::from_position(Vec3::new(20.0, 680.0, 0.0)),
        );
        world.add_component(entity, TextComponent::new("hello", Rc::new(fixture_atlas())));

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_text, 1);
        // Distinct glyphs h, e, l, o; five on-screen instances.
        assert_eq!(stats.draw_calls_text, 4);
        assert_eq!(stats.glyph_instances, 5);
        assert_eq!(headless(&renderer).counters().instanced_draw_calls, 4);

        renderer.shutdown();
    }

    #[test]
    fn empty_text_and_zero_scale_are_skipped() {
        let mut renderer = renderer();
        let mut world = World::new();
        let font = Rc::new(fixture_atlas());

        let blank = world.create_entity();
        world.add_component(blank, TransformComponent::identity());
        world.add_component(blank, TextComponent::new("", Rc::clone(&font)));

        let flat = world.create_entity();
        world.add_component(flat, TransformComponent::identity());
        let mut text = TextComponent::new("visible", font);
        text.scale = 0.0;
        world.add_component(flat, text);

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let stats = renderer.rendering_statistics();
        assert_eq!(stats.entities_text, 0);
        assert_eq!(stats.draw_calls_text, 0);

        renderer.shutdown();
    }

    #[test]
    fn composition_draws_depthless_to_default_framebuffer() {
        let mut renderer = renderer();
        let world = cube_scene(&mut renderer);

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let backend = headless(&renderer);
        let last = backend.draw_log().last().copied().unwrap();
        assert_eq!(last.target, None);
        assert!(!last.depth_test);
        // The scene draw itself went to the off-screen target.
        assert!(backend.draw_log()[0].target.is_some());

        renderer.shutdown();
    }

    #[test]
    fn disabling_post_process_skips_composition() {
        let mut renderer = renderer();
        renderer.opt_post_process(false);
        let world = cube_scene(&mut renderer);

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        let backend = headless(&renderer);
        assert_eq!(backend.draw_log().len(), 1);
        assert_eq!(backend.draw_log()[0].target, None);

        renderer.shutdown();
    }

    #[test]
    fn shared_program_uploads_frame_uniforms_once() {
        let mut renderer = renderer();
        let mut world = cube_scene(&mut renderer);
        // Second entity sharing the same shader pair.
        let mesh = renderer.create_cube().unwrap();
        let shader = renderer.register_shader("default", "default");
        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::from_position(Vec3::new(2.0, 0.0, 0.0)));
        world.add_component(entity, MeshRendererComponent::new(mesh, shader));

        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        // Locations memoize per name, so resolution count equals the distinct
        // uniform-name count regardless of entity count; a second frame adds
        // none.
        let resolved = headless(&renderer).counters().uniform_resolutions;
        renderer.draw_entities(&world, &Camera::default(), VIEWPORT);
        assert_eq!(headless(&renderer).counters().uniform_resolutions, resolved);

        renderer.shutdown();
    }

    #[test]
    fn toggles_track_state() {
        let mut renderer = renderer();
        assert!(!renderer.is_wireframe_enabled());
        renderer.toggle_wireframe();
        assert!(renderer.is_wireframe_enabled());
        renderer.opt_depth_test(false);
        renderer.opt_blend(false);
        renderer.shutdown();
    }
}
