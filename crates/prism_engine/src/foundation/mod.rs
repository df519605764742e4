//! Foundation utilities shared by every engine subsystem
//!
//! Math types, timing helpers. No rendering or scene dependencies; everything
//! above this layer is allowed to use it.

pub mod math;
pub mod time;

pub use math::{Vec2, Vec3, Vec4, Mat3, Mat4, Mat4Ext};
pub use time::{Stopwatch, Timer};
