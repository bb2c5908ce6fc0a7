//! impulse2d - 2D rigid-body physics sandbox
//!
//! Headless host around `impulse2d_physics`: layered configuration, scene
//! construction and real-time tick scheduling.

pub mod config;
pub mod scene;
pub mod systems;
