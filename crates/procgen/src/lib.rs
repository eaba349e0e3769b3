//! Procedural generation for the skydome renderer: noise phase tables
//! consumed by the GPU density shader, and the dome mesh itself.

pub mod dome;
pub mod noise_table;

pub use dome::*;
pub use noise_table::*;
