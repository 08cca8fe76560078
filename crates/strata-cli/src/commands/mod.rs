//! CLI command implementations.

pub mod common;
pub mod presets;
pub mod processors;
pub mod render;
