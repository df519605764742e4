//! Entity-Component scene container
//!
//! A flat (non-hierarchical) scene model: entities are generational keys,
//! components are plain data attached per entity. The renderer only queries
//! this container; creation and destruction are driven by the application.

pub mod components;
mod world;

pub use world::{Entity, World};

/// Marker trait for component types stored in a [`World`]
pub trait Component: 'static {}
