//! Scene construction utilities
//!
//! This module provides a declarative API for building 2D physics scenes.

mod scene_builder;

pub use scene_builder::{SceneBuilder, DEFAULT_BOX_SIZE, DEFAULT_CIRCLE_RADIUS};
