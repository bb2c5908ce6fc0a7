//! 2D Mathematics Library
//!
//! This crate provides the 2D vector type used by the impulse2d engine.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D point/vector with pure and in-place operations

mod vec2;

pub use vec2::Vec2;
