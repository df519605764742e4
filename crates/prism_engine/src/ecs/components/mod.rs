//! Built-in component types queried by the renderer

mod renderable;
mod sprite;
mod text;
mod transform;

pub use renderable::{MaterialComponent, MeshRendererComponent};
pub use sprite::{AspectRatioLock, SpriteComponent};
pub use text::TextComponent;
pub use transform::TransformComponent;
