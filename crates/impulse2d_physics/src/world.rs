//! Physics world and fixed-timestep simulation

use crate::body::{BodyKey, RigidBody};
use crate::collision::Manifold;
use crate::edit::BodyEdit;
use crate::error::PhysicsError;
use crate::pipeline::CollisionPipeline;
use crate::property::BodyProperty;
use crate::snapshot::WorldSnapshot;
use impulse2d_math::Vec2;
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravity acceleration in position units per tick (positive Y is down)
    pub gravity: Vec2,
    /// Fixed tick rate; `dt = 1 / ticks_per_second`
    pub ticks_per_second: u32,
    /// Sequential impulse passes per tick
    pub solver_iterations: u32,
    /// Fraction of penetration removed by positional correction each tick
    pub correction_percent: f32,
    /// Penetration left alone by positional correction
    pub correction_slop: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 2.0),
            ticks_per_second: 120,
            solver_iterations: 10,
            correction_percent: 0.4,
            correction_slop: 0.05,
        }
    }
}

impl PhysicsConfig {
    /// Create a config with the given gravity and tick rate and default solver settings
    pub fn new(gravity: Vec2, ticks_per_second: u32) -> Self {
        Self {
            gravity,
            ticks_per_second: ticks_per_second.max(1),
            ..Self::default()
        }
    }

    /// Fixed timestep in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.ticks_per_second.max(1) as f32
    }

    /// Velocity gravity adds in one tick
    pub fn gravity_step(&self) -> Vec2 {
        self.gravity * self.dt()
    }
}

/// The physics world containing all rigid bodies
///
/// Bodies are stored in a generational slot map and additionally kept in
/// insertion order, which fixes pair ordering, hit-testing priority and
/// render order.
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody>,
    /// Keys in insertion order
    order: Vec<BodyKey>,
    /// Physics configuration
    config: PhysicsConfig,
    pipeline: CollisionPipeline,
    paused: bool,
    debug: bool,
    tick_index: u64,
    /// Edits waiting for the next tick
    pending: Vec<BodyEdit>,
    /// Manifolds from the most recent unpaused tick
    manifolds: Vec<Manifold>,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            pipeline: CollisionPipeline::from_config(&config),
            config,
            paused: false,
            debug: false,
            tick_index: 0,
            pending: Vec::new(),
            manifolds: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        let kind = body.kind();
        let is_static = body.is_static();
        let key = self.bodies.insert(body);
        self.order.push(key);
        log::debug!("Added {} body {:?} (static: {})", kind, key, is_static);
        key
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        let body = self.bodies.remove(key)?;
        self.order.retain(|k| *k != key);
        self.manifolds.retain(|m| m.a != key && m.b != key);
        log::debug!("Removed body {:?}", key);
        Some(body)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys in insertion order
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.order.iter().copied()
    }

    /// Iterate over all bodies in insertion order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &RigidBody)> + '_ {
        self.order
            .iter()
            .filter_map(move |key| self.bodies.get(*key).map(|body| (*key, body)))
    }

    /// Top-most body containing `point`; later insertions win
    pub fn body_at(&self, point: Vec2) -> Option<BodyKey> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|key| self.bodies.get(*key).is_some_and(|body| body.is_inside(point)))
    }

    fn body_mut_or_err(&mut self, key: BodyKey) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.get_mut(key).ok_or(PhysicsError::BodyNotFound)
    }

    /// Make a body static right away
    pub fn set_static(&mut self, key: BodyKey) -> Result<(), PhysicsError> {
        self.body_mut_or_err(key)?.set_static();
        Ok(())
    }

    /// Move a body right away, e.g. while it is dragged
    pub fn translate_body(&mut self, key: BodyKey, delta: Vec2) -> Result<(), PhysicsError> {
        self.body_mut_or_err(key)?.translate(delta);
        Ok(())
    }

    /// Set a body property right away
    pub fn set_property(&mut self, key: BodyKey, property: BodyProperty, value: f32) -> Result<(), PhysicsError> {
        self.body_mut_or_err(key)?.set_property(property, value);
        Ok(())
    }

    /// Set a body property from its textual name
    pub fn set_property_by_name(&mut self, key: BodyKey, name: &str, value: f32) -> Result<(), PhysicsError> {
        let property: BodyProperty = name.parse()?;
        self.set_property(key, property, value)
    }

    /// Read a body property
    pub fn property(&self, key: BodyKey, property: BodyProperty) -> Result<f32, PhysicsError> {
        self.bodies
            .get(key)
            .map(|body| body.property(property))
            .ok_or(PhysicsError::BodyNotFound)
    }

    /// Queue an edit for the start of the next tick
    pub fn queue_edit(&mut self, edit: BodyEdit) {
        self.pending.push(edit);
    }

    /// Number of edits waiting for the next tick
    pub fn pending_edits(&self) -> usize {
        self.pending.len()
    }

    fn apply_edit(&mut self, edit: BodyEdit) -> Result<(), PhysicsError> {
        match edit {
            BodyEdit::SetStatic(key) => self.set_static(key),
            BodyEdit::Translate(key, delta) => self.translate_body(key, delta),
            BodyEdit::SetProperty(key, property, value) => self.set_property(key, property, value),
            BodyEdit::Remove(key) => self.remove_body(key).map(|_| ()).ok_or(PhysicsError::BodyNotFound),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze all bodies; ticks still count and edits still apply
    pub fn pause(&mut self) {
        if !self.paused {
            log::debug!("Simulation paused at tick {}", self.tick_index);
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::debug!("Simulation resumed at tick {}", self.tick_index);
        }
        self.paused = false;
    }

    /// Flip the pause flag and return the new state
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Include contact points in snapshots
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Number of ticks run so far, paused ones included
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Manifolds found by the most recent unpaused tick
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }

    /// Advance the simulation by one fixed step
    ///
    /// This performs, strictly in order:
    /// 1. Queued edits (also while paused)
    /// 2. Contact detection over all pairs
    /// 3. Impulse resolution for every manifold
    /// 4. Integration of every body
    /// 5. Positional correction for every manifold
    pub fn tick(&mut self) {
        self.tick_index += 1;

        for edit in std::mem::take(&mut self.pending) {
            let key = edit.key();
            if let Err(err) = self.apply_edit(edit) {
                log::warn!("Dropped edit for body {:?}: {}", key, err);
            }
        }

        if self.paused {
            return;
        }

        let dt = self.config.dt();
        let gravity = self.config.gravity;

        let manifolds = self.pipeline.detect(&self.bodies, &self.order);
        self.pipeline
            .apply_impulses(&mut self.bodies, &manifolds, self.config.gravity_step());

        for key in &self.order {
            if let Some(body) = self.bodies.get_mut(*key) {
                body.tick(dt, gravity);
            }
        }

        self.pipeline.positional_correction(&mut self.bodies, &manifolds);

        if !manifolds.is_empty() {
            log::debug!("Tick {}: {} manifold(s)", self.tick_index, manifolds.len());
        }
        self.manifolds = manifolds;
    }

    /// Capture what a renderer needs for the current frame
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> RigidBody {
        RigidBody::rectangle(vec![
            Vec2::new(100.0, 1200.0),
            Vec2::new(1500.0, 1200.0),
            Vec2::new(1500.0, 1300.0),
            Vec2::new(100.0, 1300.0),
        ])
        .unwrap()
        .with_static()
    }

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, 2.0));
        assert_eq!(config.ticks_per_second, 120);
        assert!((config.dt() - 1.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_physics_config_custom() {
        let config = PhysicsConfig::new(Vec2::new(0.0, 9.8), 60);
        assert_eq!(config.gravity, Vec2::new(0.0, 9.8));
        assert!((config.dt() - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(config.solver_iterations, 10);
    }

    #[test]
    fn test_physics_config_zero_rate_is_guarded() {
        let config = PhysicsConfig::new(Vec2::ZERO, 0);
        assert_eq!(config.ticks_per_second, 1);
        assert_eq!(config.dt(), 1.0);
    }

    #[test]
    fn test_world_add_body() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.body_count(), 0);

        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 5.0), 0.5).unwrap());

        assert!(world.get_body(key).is_some());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_world_get_body_mut() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_body(RigidBody::circle(Vec2::new(0.0, 5.0), 0.5).unwrap());

        {
            let body_mut = world.get_body_mut(handle).expect("Body should exist");
            body_mut.velocity = Vec2::new(1.0, 0.0);
        }

        let retrieved = world.get_body(handle).expect("Body should exist");
        assert_eq!(retrieved.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 5.0), 0.5).unwrap());

        assert!(world.remove_body(key).is_some());
        assert!(world.get_body(key).is_none());
        assert!(world.remove_body(key).is_none());

        // Add a new body - it gets a different key
        let new_key = world.add_body(RigidBody::circle(Vec2::new(1.0, 5.0), 0.5).unwrap());

        // Old key still returns None (generational safety)
        assert!(world.get_body(key).is_none());
        assert!(world.get_body(new_key).is_some());
        assert_eq!(world.body_keys().collect::<Vec<_>>(), vec![new_key]);
    }

    #[test]
    fn test_bodies_iterate_in_insertion_order() {
        let mut world = PhysicsWorld::new();
        let first = world.add_body(floor());
        let second = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 5.0).unwrap());
        let third = world.add_body(RigidBody::circle(Vec2::new(50.0, 0.0), 5.0).unwrap());
        world.remove_body(second);

        let keys: Vec<BodyKey> = world.bodies().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![first, third]);
    }

    #[test]
    fn test_gravity_application() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_body(RigidBody::circle(Vec2::new(0.0, 10.0), 0.5).unwrap());

        world.tick();

        let body = world.get_body(handle).unwrap();
        // (0 + 2 * dt) damped once
        let expected = 2.0 / 120.0 * 0.9999;
        assert!((body.velocity.y - expected).abs() < 1e-6);
        // displaced by the undamped velocity
        assert!((body.center().y - (10.0 + 2.0 / 120.0)).abs() < 1e-4);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_body(floor());
        let before = world.get_body(handle).unwrap().vertices().to_vec();

        for _ in 0..10 {
            world.tick();
        }

        let body = world.get_body(handle).unwrap();
        assert_eq!(body.vertices(), before.as_slice());
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_body_at_prefers_last_inserted() {
        let mut world = PhysicsWorld::new();
        let below = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());
        let above = world.add_body(RigidBody::circle(Vec2::new(5.0, 0.0), 10.0).unwrap());

        assert_eq!(world.body_at(Vec2::new(3.0, 0.0)), Some(above));
        assert_eq!(world.body_at(Vec2::new(-8.0, 0.0)), Some(below));
        assert_eq!(world.body_at(Vec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_body_at_finds_spinning_box() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec2::ZERO, 120));
        let key = world.add_body(
            RigidBody::rectangle_from_corners(Vec2::new(700.0, 1000.0), Vec2::new(900.0, 1100.0))
                .unwrap()
                .with_angular_velocity(0.013),
        );

        for tick in 0..600 {
            world.tick();
            let center = world.get_body(key).unwrap().center();
            assert_eq!(world.body_at(center), Some(key), "missed after {} ticks", tick + 1);
        }
    }

    #[test]
    fn test_set_property_by_name() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());

        world.set_property_by_name(key, "restitution", 0.9).unwrap();
        assert_eq!(world.property(key, BodyProperty::Restitution).unwrap(), 0.9);

        let err = world.set_property_by_name(key, "mass", 1.0).unwrap_err();
        assert_eq!(err, PhysicsError::UnknownProperty("mass".to_string()));
    }

    #[test]
    fn test_edits_on_missing_body_fail() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());
        world.remove_body(key);

        assert_eq!(world.set_static(key), Err(PhysicsError::BodyNotFound));
        assert_eq!(world.translate_body(key, Vec2::X), Err(PhysicsError::BodyNotFound));
        assert_eq!(world.property(key, BodyProperty::Angle), Err(PhysicsError::BodyNotFound));
    }

    #[test]
    fn test_paused_tick_counts_and_freezes() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());
        world.pause();

        for _ in 0..5 {
            world.tick();
        }

        assert_eq!(world.tick_index(), 5);
        let body = world.get_body(key).unwrap();
        assert_eq!(body.center(), Vec2::ZERO);
        assert_eq!(body.velocity, Vec2::ZERO);

        assert!(!world.toggle_pause());
        world.tick();
        assert_eq!(world.tick_index(), 6);
        assert!(world.get_body(key).unwrap().center().y > 0.0);
    }

    #[test]
    fn test_queued_edits_apply_while_paused() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());
        world.pause();

        world.queue_edit(BodyEdit::Translate(key, Vec2::new(5.0, 0.0)));
        world.queue_edit(BodyEdit::SetProperty(key, BodyProperty::Red, 12.4));
        world.queue_edit(BodyEdit::SetStatic(key));
        assert_eq!(world.pending_edits(), 3);

        // Applied on the next tick, not before
        assert_eq!(world.get_body(key).unwrap().center(), Vec2::ZERO);
        world.tick();

        assert_eq!(world.pending_edits(), 0);
        let body = world.get_body(key).unwrap();
        assert_eq!(body.center(), Vec2::new(5.0, 0.0));
        assert_eq!(body.appearance.red, 12);
        assert!(body.is_static());
    }

    #[test]
    fn test_body_made_static_while_moving_pushes_nothing() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec2::ZERO, 120));
        let wall = world.add_body(
            RigidBody::circle(Vec2::new(0.0, 0.0), 10.0)
                .unwrap()
                .with_velocity(Vec2::new(5.0, 0.0)),
        );
        let ball = world.add_body(RigidBody::circle(Vec2::new(18.0, 0.0), 10.0).unwrap());
        world.queue_edit(BodyEdit::SetStatic(wall));

        world.tick();

        let wall = world.get_body(wall).unwrap();
        assert_eq!(wall.center(), Vec2::ZERO);
        assert_eq!(wall.velocity, Vec2::ZERO);
        assert_eq!(world.get_body(ball).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_failed_edit_does_not_block_others() {
        let mut world = PhysicsWorld::new();
        let gone = world.add_body(RigidBody::circle(Vec2::new(0.0, 0.0), 10.0).unwrap());
        let kept = world.add_body(RigidBody::circle(Vec2::new(100.0, 0.0), 10.0).unwrap());
        world.remove_body(gone);
        world.pause();

        world.queue_edit(BodyEdit::Translate(gone, Vec2::X));
        world.queue_edit(BodyEdit::Remove(kept));
        world.tick();

        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_manifolds_kept_for_last_tick() {
        let mut world = PhysicsWorld::new();
        world.add_body(floor());
        world.add_body(RigidBody::circle(Vec2::new(200.0, 1152.0), 50.0).unwrap());

        world.tick();
        assert_eq!(world.manifolds().len(), 1);
        assert_eq!(world.manifolds()[0].contacts.len(), 1);
    }
}
