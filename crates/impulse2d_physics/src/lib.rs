//! 2D rigid-body physics for impulse2d
//!
//! This crate provides:
//! - Collision shapes (circles, rectangles, convex polygons)
//! - Separating-axis contact detection with face clipping
//! - Sequential impulse resolution with Coulomb friction
//! - Positional correction and a fixed-timestep world

pub mod body;
pub mod collision;
pub mod edit;
pub mod error;
pub mod material;
pub mod pipeline;
pub mod property;
pub mod shapes;
pub mod snapshot;
pub mod world;

// Re-export commonly used types
pub use body::{Appearance, BodyKey, RigidBody, AIR_RESISTANCE};
pub use collision::{collide, Collision, ContactPoint, Manifold};
pub use edit::BodyEdit;
pub use error::PhysicsError;
pub use material::PhysicsMaterial;
pub use pipeline::CollisionPipeline;
pub use property::BodyProperty;
pub use shapes::{Circle, Polygon, Shape, ShapeKind, CIRCLE_MOMENT_OF_INERTIA, RECTANGLE_MOMENT_OF_INERTIA};
pub use snapshot::{BodyView, WorldSnapshot};
pub use world::{PhysicsConfig, PhysicsWorld};
