//! Core types shared across the renderer and viewer:
//! - Frame timing and pacing
//! - Math re-exports

pub mod time;

pub use time::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
