//! Rigid body types for 2D physics simulation

use std::f32::consts::TAU;

use crate::error::PhysicsError;
use crate::material::PhysicsMaterial;
use crate::property::BodyProperty;
use crate::shapes::{Shape, ShapeKind};
use impulse2d_math::Vec2;
use slotmap::new_key_type;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing so that a key to a removed body returns
    /// None instead of pointing at whatever reused its slot.
    pub struct BodyKey;
}

/// Per-tick multiplicative damping of linear and angular velocity
pub const AIR_RESISTANCE: f32 = 0.9999;

/// Cosmetic attributes, carried for the renderer only
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity (0.0 = transparent, 1.0 = opaque)
    pub alpha: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            red: 255,
            green: 0,
            blue: 0,
            alpha: 1.0,
        }
    }
}

impl Appearance {
    /// Create an appearance from RGB channels and opacity
    pub fn new(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

/// A 2D rigid body: shape, motion state, mass properties and material
///
/// Velocity is in position units per tick and angular velocity in radians per
/// tick. A body with zero mass and zero inertia is static (infinite mass).
#[derive(Clone, Debug)]
pub struct RigidBody {
    shape: Shape,
    /// Linear velocity (position units per tick)
    pub velocity: Vec2,
    /// Angular velocity (radians per tick)
    pub angular_velocity: f32,
    angle: f32,
    force: Vec2,
    torque: f32,
    density: f32,
    area: f32,
    mass: f32,
    inv_mass: f32,
    moment_of_inertia: f32,
    inv_moment_of_inertia: f32,
    /// Friction and restitution
    pub material: PhysicsMaterial,
    /// Color and opacity for the renderer
    pub appearance: Appearance,
}

impl RigidBody {
    /// Create a dynamic body with density 1 from an already validated shape
    pub fn new(shape: Shape) -> Self {
        let mut body = Self {
            shape,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            angle: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            density: 1.0,
            area: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            moment_of_inertia: 0.0,
            inv_moment_of_inertia: 0.0,
            material: PhysicsMaterial::default(),
            appearance: Appearance::default(),
        };
        body.compute_area();
        body.compute_mass();
        body
    }

    /// Create a circular body
    pub fn circle(center: Vec2, radius: f32) -> Result<Self, PhysicsError> {
        Ok(Self::new(Shape::circle(center, radius)?))
    }

    /// Create a rectangular body from four vertices
    pub fn rectangle(vertices: Vec<Vec2>) -> Result<Self, PhysicsError> {
        Ok(Self::new(Shape::rectangle(vertices)?))
    }

    /// Create an axis-aligned rectangular body spanned by two corners
    pub fn rectangle_from_corners(anchor: Vec2, corner: Vec2) -> Result<Self, PhysicsError> {
        Ok(Self::new(Shape::rectangle_from_corners(anchor, corner)?))
    }

    /// Create a convex polygon body
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, PhysicsError> {
        Ok(Self::new(Shape::polygon(vertices)?))
    }

    /// Set the density and derive mass and inertia from it
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density.max(0.0);
        self.compute_mass();
        self
    }

    /// Set the physics material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set the restitution (bounciness) of this body
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Set the friction coefficient of this body
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material.friction = friction.max(0.0);
        self
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the angular velocity of this body
    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Set the color and opacity
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// Make this body static
    pub fn with_static(mut self) -> Self {
        self.set_static();
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn vertices(&self) -> &[Vec2] {
        self.shape.vertices()
    }

    pub fn normals(&self) -> &[Vec2] {
        self.shape.normals()
    }

    /// Center of mass
    pub fn center(&self) -> Vec2 {
        self.shape.center()
    }

    pub fn radius(&self) -> Option<f32> {
        self.shape.radius()
    }

    /// Orientation in [0, 2π)
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Force accumulated since the last tick
    pub fn force(&self) -> Vec2 {
        self.force
    }

    /// Torque accumulated since the last tick
    pub fn torque(&self) -> f32 {
        self.torque
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn moment_of_inertia(&self) -> f32 {
        self.moment_of_inertia
    }

    pub fn inv_moment_of_inertia(&self) -> f32 {
        self.inv_moment_of_inertia
    }

    /// Static bodies have zero mass and zero inertia
    pub fn is_static(&self) -> bool {
        self.mass == 0.0 && self.moment_of_inertia == 0.0
    }

    /// Accumulate a force for the next tick
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Accumulate a torque for the next tick
    pub fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// Apply an impulse at `contact_vector` (relative to the center of mass)
    ///
    /// Static bodies are unaffected because both inverse terms are zero.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_vector: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_moment_of_inertia * contact_vector.cross(impulse);
    }

    /// Shift the body
    pub fn translate(&mut self, delta: Vec2) {
        self.shape.translate(delta);
    }

    /// Rotate about the center of mass and advance the stored angle
    pub fn rotate(&mut self, delta: f32) {
        self.shape.rotate(delta);
        let wrapped = (self.angle + delta).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.angle = if wrapped >= TAU { 0.0 } else { wrapped };
    }

    /// Support point in `direction`
    pub fn farthest_vertex(&self, direction: Vec2) -> Vec2 {
        self.shape.support(direction)
    }

    /// Best reference face of this body against `other`, with its separation
    pub fn least_penetration(&self, other: &RigidBody) -> Option<(f32, usize)> {
        self.shape.least_penetration(&other.shape)
    }

    /// Face of `other` most anti-parallel to this body's `reference_face`
    pub fn find_incident_face(&self, other: &RigidBody, reference_face: usize) -> Option<usize> {
        self.shape.find_incident_face(&other.shape, reference_face)
    }

    /// Whether `point` lies inside the body
    pub fn is_inside(&self, point: Vec2) -> bool {
        self.shape.contains(point)
    }

    /// Recompute the area from the current geometry
    pub fn compute_area(&mut self) {
        self.area = self.shape.area();
    }

    /// Derive mass and inertia from density and area
    ///
    /// This also turns a static body dynamic again.
    pub fn compute_mass(&mut self) {
        self.mass = self.density * self.area;
        self.inv_mass = if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 };
        self.moment_of_inertia = if self.mass > 0.0 {
            self.shape.moment_of_inertia(self.density)
        } else {
            0.0
        };
        self.inv_moment_of_inertia = if self.moment_of_inertia > 0.0 {
            1.0 / self.moment_of_inertia
        } else {
            0.0
        };
    }

    /// Give the body infinite mass: it never moves or rotates again
    ///
    /// Any velocity it had is discarded so contacts see it at rest.
    pub fn set_static(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.moment_of_inertia = 0.0;
        self.inv_moment_of_inertia = 0.0;
    }

    /// Advance the body by one tick
    ///
    /// Integration is tick-coupled: `dt` scales how fast force and gravity
    /// build up velocity, but the body is displaced by the raw velocity and
    /// rotated by the raw angular velocity. Accumulators are cleared even for
    /// static bodies.
    pub fn tick(&mut self, dt: f32, gravity: Vec2) {
        if self.mass > 0.0 {
            let acceleration = self.force * self.inv_mass + gravity;
            self.velocity += acceleration * dt;
            self.translate(self.velocity);

            self.angular_velocity += self.torque * self.inv_moment_of_inertia * dt;
            if self.angular_velocity != 0.0 {
                self.rotate(self.angular_velocity);
            }

            self.velocity *= AIR_RESISTANCE;
            self.angular_velocity *= AIR_RESISTANCE;
        }

        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Current value of a named property
    pub fn property(&self, property: BodyProperty) -> f32 {
        match property {
            BodyProperty::Angle => self.angle,
            BodyProperty::Density => self.density,
            BodyProperty::Restitution => self.material.restitution,
            BodyProperty::Friction => self.material.friction,
            BodyProperty::Red => self.appearance.red as f32,
            BodyProperty::Green => self.appearance.green as f32,
            BodyProperty::Blue => self.appearance.blue as f32,
            BodyProperty::Alpha => self.appearance.alpha,
        }
    }

    /// Set a named property, clamped to its range
    ///
    /// Angle changes go through `rotate` so geometry and normals stay in sync.
    /// Density changes re-derive mass unless the body is static.
    pub fn set_property(&mut self, property: BodyProperty, value: f32) {
        let value = property.sanitize(value);
        match property {
            BodyProperty::Angle => self.rotate(value - self.angle),
            BodyProperty::Density => {
                self.density = value;
                if !self.is_static() {
                    self.compute_mass();
                }
            }
            BodyProperty::Restitution => self.material.restitution = value,
            BodyProperty::Friction => self.material.friction = value,
            BodyProperty::Red => self.appearance.red = value as u8,
            BodyProperty::Green => self.appearance.green = value as u8,
            BodyProperty::Blue => self.appearance.blue = value as u8,
            BodyProperty::Alpha => self.appearance.alpha = value,
        }
    }
}
