//! SceneBuilder - Declarative scene construction
//!
//! Provides a fluent API for populating a physics world.

use impulse2d_math::Vec2;
use impulse2d_physics::{PhysicsConfig, PhysicsError, PhysicsWorld, RigidBody};

use crate::config::{AppConfig, BoxConfig, CircleConfig, FloorConfig};

/// Default radius for circles placed without an explicit size
pub const DEFAULT_CIRCLE_RADIUS: f32 = 50.0;

/// Default extents (width, height) for rectangles placed without an explicit size
pub const DEFAULT_BOX_SIZE: Vec2 = Vec2::new(200.0, 100.0);

/// Builder for constructing physics scenes
///
/// # Example
/// ```ignore
/// let world = SceneBuilder::new()
///     .add_floor(Vec2::new(100.0, 1200.0), Vec2::new(1500.0, 1300.0))?
///     .add_circle(Vec2::new(200.0, 1100.0), 50.0)?
///     .build();
/// ```
pub struct SceneBuilder {
    world: PhysicsWorld,
}

impl SceneBuilder {
    /// Create a new scene builder with the default physics config
    pub fn new() -> Self {
        Self {
            world: PhysicsWorld::new(),
        }
    }

    /// Create a scene builder with a custom physics config
    pub fn with_physics(config: PhysicsConfig) -> Self {
        Self {
            world: PhysicsWorld::with_config(config),
        }
    }

    /// Build the whole scene described by an application config
    pub fn from_config(config: &AppConfig) -> Result<Self, PhysicsError> {
        let mut builder = Self::with_physics(config.simulation.to_physics_config());

        if let Some(floor) = &config.scene.floor {
            builder = builder.add_floor_config(floor)?;
        }
        for circle in &config.scene.circles {
            builder = builder.add_circle_config(circle)?;
        }
        for rect in &config.scene.boxes {
            builder = builder.add_box_config(rect)?;
        }

        builder.world.set_debug(config.debug.show_contacts);
        if config.run.start_paused {
            builder.world.pause();
        }

        Ok(builder)
    }

    /// Add a static floor spanned by two corners
    pub fn add_floor(self, min: Vec2, max: Vec2) -> Result<Self, PhysicsError> {
        let floor = RigidBody::rectangle_from_corners(min, max)?.with_static();
        Ok(self.add_body(floor))
    }

    /// Add a dynamic circle with density 1
    pub fn add_circle(self, center: Vec2, radius: f32) -> Result<Self, PhysicsError> {
        Ok(self.add_body(RigidBody::circle(center, radius)?))
    }

    /// Add a dynamic axis-aligned box with density 1
    pub fn add_box(self, min: Vec2, max: Vec2) -> Result<Self, PhysicsError> {
        Ok(self.add_body(RigidBody::rectangle_from_corners(min, max)?))
    }

    /// Add a dynamic box of the default size centered on `center`
    pub fn add_default_box(self, center: Vec2) -> Result<Self, PhysicsError> {
        let half = DEFAULT_BOX_SIZE * 0.5;
        self.add_box(center - half, center + half)
    }

    /// Add a dynamic circle of the default radius
    pub fn add_default_circle(self, center: Vec2) -> Result<Self, PhysicsError> {
        self.add_circle(center, DEFAULT_CIRCLE_RADIUS)
    }

    /// Add a custom body to the scene
    ///
    /// For bodies that don't fit the standard patterns.
    pub fn add_body(mut self, body: RigidBody) -> Self {
        self.world.add_body(body);
        self
    }

    fn add_floor_config(self, floor: &FloorConfig) -> Result<Self, PhysicsError> {
        self.add_floor(floor.min.into(), floor.max.into())
    }

    fn add_circle_config(self, circle: &CircleConfig) -> Result<Self, PhysicsError> {
        let mut body = RigidBody::circle(circle.center.into(), circle.radius)?
            .with_density(circle.density)
            .with_velocity(circle.velocity.into());
        if circle.is_static {
            body = body.with_static();
        }
        Ok(self.add_body(body))
    }

    fn add_box_config(self, rect: &BoxConfig) -> Result<Self, PhysicsError> {
        let mut body = RigidBody::rectangle_from_corners(rect.min.into(), rect.max.into())?
            .with_density(rect.density)
            .with_velocity(rect.velocity.into());
        if rect.angle != 0.0 {
            body.rotate(rect.angle);
        }
        if rect.is_static {
            body = body.with_static();
        }
        Ok(self.add_body(body))
    }

    /// Number of bodies added so far
    pub fn body_count(&self) -> usize {
        self.world.body_count()
    }

    /// Build the scene and return the configured world
    pub fn build(self) -> PhysicsWorld {
        log::info!("Scene built with {} bodies", self.world.body_count());
        self.world
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use impulse2d_physics::ShapeKind;

    #[test]
    fn test_empty_scene() {
        let world = SceneBuilder::new().build();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.config(), &PhysicsConfig::default());
    }

    #[test]
    fn test_scene_with_physics() {
        let config = PhysicsConfig::new(Vec2::new(0.0, 9.8), 60);
        let world = SceneBuilder::with_physics(config.clone()).build();
        assert_eq!(world.config(), &config);
    }

    #[test]
    fn test_scene_with_floor() {
        let world = SceneBuilder::new()
            .add_floor(Vec2::new(100.0, 1200.0), Vec2::new(1500.0, 1300.0))
            .unwrap()
            .build();

        assert_eq!(world.body_count(), 1);
        let (_, floor) = world.bodies().next().unwrap();
        assert!(floor.is_static());
        assert_eq!(floor.kind(), ShapeKind::Rectangle);
    }

    #[test]
    fn test_default_sizes() {
        let world = SceneBuilder::new()
            .add_default_circle(Vec2::new(0.0, 0.0))
            .unwrap()
            .add_default_box(Vec2::new(500.0, 500.0))
            .unwrap()
            .build();

        let bodies: Vec<_> = world.bodies().map(|(_, b)| b).collect();
        assert_eq!(bodies[0].radius(), Some(DEFAULT_CIRCLE_RADIUS));
        assert_eq!(bodies[1].area(), 200.0 * 100.0);
        assert_eq!(bodies[1].center(), Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        let result = SceneBuilder::new().add_circle(Vec2::ZERO, 0.0);
        assert!(matches!(result, Err(PhysicsError::InvalidShape(_))));
    }

    #[test]
    fn test_from_default_config() {
        let config = AppConfig::default();
        let world = SceneBuilder::from_config(&config).unwrap().build();

        // floor + circle
        assert_eq!(world.body_count(), 2);
        let kinds: Vec<ShapeKind> = world.bodies().map(|(_, b)| b.kind()).collect();
        assert_eq!(kinds, vec![ShapeKind::Rectangle, ShapeKind::Circle]);
        assert!(!world.is_paused());
        assert!(!world.is_debug());
    }

    #[test]
    fn test_from_config_applies_run_and_debug() {
        let mut config = AppConfig::default();
        config.run.start_paused = true;
        config.debug.show_contacts = true;
        config.scene = SceneConfig {
            floor: None,
            circles: Vec::new(),
            boxes: vec![BoxConfig {
                min: [0.0, 0.0],
                max: [20.0, 10.0],
                density: 2.0,
                angle: 0.5,
                velocity: [1.0, 0.0],
                is_static: false,
            }],
        };

        let world = SceneBuilder::from_config(&config).unwrap().build();
        assert!(world.is_paused());
        assert!(world.is_debug());

        let (_, body) = world.bodies().next().unwrap();
        assert_eq!(body.mass(), 400.0);
        assert!((body.angle() - 0.5).abs() < 1e-6);
        assert_eq!(body.velocity, Vec2::new(1.0, 0.0));
    }
}
