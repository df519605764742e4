//! Prism Engine
//!
//! A real-time rendering engine core: an entity-component scene model driving
//! a layered renderer (3D meshes, 2D sprites, screen-space text) over a
//! pluggable graphics backend, with shader program caching, off-screen
//! post-processing, and camera view/projection math.
//!
//! The graphics API, windowing, and asset loading live behind narrow
//! boundaries ([`render::api::RenderBackend`], [`input::InputState`], opaque
//! texture handles); the crate ships a headless validating backend so the
//! whole pipeline runs and tests without a GPU.
//!
//! ```no_run
//! use prism_engine::prelude::*;
//! use prism_engine::render::backends::HeadlessBackend;
//!
//! let mut renderer = Renderer::new(
//!     Box::new(HeadlessBackend::new()),
//!     RendererConfig::default(),
//!     (1280, 720),
//! )
//! .unwrap();
//!
//! let mut world = World::new();
//! let mesh = renderer.create_cube().unwrap();
//! let shader = renderer.register_shader("default", "default");
//! let entity = world.create_entity();
//! world.add_component(entity, TransformComponent::identity());
//! world.add_component(entity, MeshRendererComponent::new(mesh, shader));
//!
//! let camera = Camera::default();
//! renderer.draw_entities(&world, &camera, (1280, 720));
//! renderer.shutdown();
//! ```

pub mod ecs;
pub mod foundation;
pub mod input;
pub mod render;

/// Commonly used types, re-exported for application code
pub mod prelude {
    pub use crate::ecs::components::{
        AspectRatioLock, MaterialComponent, MeshRendererComponent, SpriteComponent, TextComponent,
        TransformComponent,
    };
    pub use crate::ecs::{Entity, World};
    pub use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4};
    pub use crate::foundation::time::{Stopwatch, Timer};
    pub use crate::input::{CameraBindings, InputState, KeyCode, MouseButton};
    pub use crate::render::{
        Camera, FontAtlas, GlyphInfo, LightingEnvironment, ProjectionMode, RenderError,
        RenderStats, Renderer, RendererConfig, ShaderReference, TextureHandle,
    };
}
