//! Graphics backend implementations
//!
//! The engine core only talks to [`crate::render::api::RenderBackend`]; this
//! module holds the implementations shipped with the crate. The headless
//! backend validates resource lifetimes and records command streams so the
//! whole pipeline can run (and be tested) without a GPU or display. Native
//! API backends implement the same trait out of tree.

pub mod headless;

pub use headless::{BackendCounters, DrawEvent, HeadlessBackend, UniformValue};
