//! Per-tick contact detection and resolution
//!
//! The pipeline never owns bodies. Detection only reads them; resolution
//! mutates them through `RigidBody::apply_impulse` and `RigidBody::translate`.

use crate::body::{BodyKey, RigidBody};
use crate::collision::{collide, ContactPoint, Manifold};
use crate::world::PhysicsConfig;
use impulse2d_math::Vec2;
use slotmap::SlotMap;

/// Added to the squared gravity step when testing for a resting contact
const RESTING_EPSILON: f32 = 0.0001;

/// Detection, sequential impulses and positional correction
#[derive(Clone, Debug)]
pub struct CollisionPipeline {
    /// Passes over all contacts per tick
    pub solver_iterations: u32,
    /// Fraction of the penetration removed per tick
    pub correction_percent: f32,
    /// Penetration tolerated without correction
    pub correction_slop: f32,
}

impl Default for CollisionPipeline {
    fn default() -> Self {
        Self::from_config(&PhysicsConfig::default())
    }
}

/// Solver state for one contact point, rebuilt every tick
#[derive(Clone, Copy, Debug)]
struct ContactConstraint {
    ra: Vec2,
    rb: Vec2,
    normal_mass: f32,
    tangent_mass: f32,
    target_velocity: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

/// Mass terms of both bodies plus the combined material of the pair
#[derive(Clone, Copy, Debug)]
struct PairProperties {
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_inertia_a: f32,
    inv_inertia_b: f32,
    restitution: f32,
    friction: f32,
}

impl CollisionPipeline {
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self {
            solver_iterations: config.solver_iterations.max(1),
            correction_percent: config.correction_percent,
            correction_slop: config.correction_slop,
        }
    }

    /// Test every pair `(i, j), i < j` in `order` and collect the manifolds
    ///
    /// Pairs of two static bodies are never tested.
    pub fn detect(&self, bodies: &SlotMap<BodyKey, RigidBody>, order: &[BodyKey]) -> Vec<Manifold> {
        let mut manifolds = Vec::new();

        for (i, &key_a) in order.iter().enumerate() {
            let Some(body_a) = bodies.get(key_a) else {
                continue;
            };

            for &key_b in &order[i + 1..] {
                let Some(body_b) = bodies.get(key_b) else {
                    continue;
                };

                if body_a.is_static() && body_b.is_static() {
                    continue;
                }

                if let Some(collision) = collide(body_a.shape(), body_b.shape()) {
                    log::trace!(
                        "contact {:?} -> {:?}: normal {:?}, {} point(s), depth {:.4}",
                        key_a,
                        key_b,
                        collision.normal,
                        collision.contacts.len(),
                        collision.penetration()
                    );
                    manifolds.push(Manifold::new(key_a, key_b, collision));
                }
            }
        }

        manifolds
    }

    /// Resolve contact velocities for every manifold
    ///
    /// Impulses are accumulated per contact over `solver_iterations` passes and
    /// clamped so the total normal impulse never pulls the bodies together.
    /// Contacts already separating at the start of the tick are skipped.
    /// `gravity_step` is the velocity gravity adds in one tick; contacts slower
    /// than that are treated as resting and do not bounce.
    pub fn apply_impulses(
        &self,
        bodies: &mut SlotMap<BodyKey, RigidBody>,
        manifolds: &[Manifold],
        gravity_step: Vec2,
    ) {
        let resting_speed_sq = gravity_step.length_squared() + RESTING_EPSILON;

        let mut prepared: Vec<(usize, PairProperties, Vec<ContactConstraint>)> = Vec::with_capacity(manifolds.len());
        for (index, manifold) in manifolds.iter().enumerate() {
            let (Some(a), Some(b)) = (bodies.get(manifold.a), bodies.get(manifold.b)) else {
                continue;
            };

            let material = a.material.combine(&b.material);
            let pair = PairProperties {
                inv_mass_a: a.inv_mass(),
                inv_mass_b: b.inv_mass(),
                inv_inertia_a: a.inv_moment_of_inertia(),
                inv_inertia_b: b.inv_moment_of_inertia(),
                restitution: material.restitution,
                friction: material.friction,
            };

            let constraints: Vec<ContactConstraint> = manifold
                .contacts
                .iter()
                .filter_map(|contact| prepare_contact(a, b, manifold.normal, contact, &pair, resting_speed_sq))
                .collect();

            if !constraints.is_empty() {
                prepared.push((index, pair, constraints));
            }
        }

        for _ in 0..self.solver_iterations {
            for (index, pair, constraints) in &mut prepared {
                let manifold = &manifolds[*index];
                for constraint in constraints.iter_mut() {
                    solve_contact(bodies, manifold, pair, constraint);
                }
            }
        }
    }

    /// Push overlapping bodies apart along the contact normal
    ///
    /// Each body moves by its inverse-mass share of the mean penetration beyond
    /// the slop, scaled by `correction_percent`. Static bodies never move.
    pub fn positional_correction(&self, bodies: &mut SlotMap<BodyKey, RigidBody>, manifolds: &[Manifold]) {
        for manifold in manifolds {
            let (Some(a), Some(b)) = (bodies.get(manifold.a), bodies.get(manifold.b)) else {
                continue;
            };

            let inv_mass_a = a.inv_mass();
            let inv_mass_b = b.inv_mass();
            let inv_mass_sum = inv_mass_a + inv_mass_b;
            if inv_mass_sum <= 0.0 {
                continue;
            }

            let depth = (manifold.penetration() - self.correction_slop).max(0.0);
            if depth <= 0.0 {
                continue;
            }

            let correction = manifold.normal * (depth / inv_mass_sum * self.correction_percent);

            if inv_mass_a > 0.0 {
                if let Some(body) = bodies.get_mut(manifold.a) {
                    body.translate(-correction * inv_mass_a);
                }
            }
            if inv_mass_b > 0.0 {
                if let Some(body) = bodies.get_mut(manifold.b) {
                    body.translate(correction * inv_mass_b);
                }
            }
        }
    }
}

/// Velocity of the material point at `r` from the body's center
///
/// Static bodies never move, whatever their velocity field holds.
fn point_velocity(body: &RigidBody, r: Vec2) -> Vec2 {
    if body.is_static() {
        return Vec2::ZERO;
    }
    body.velocity + Vec2::new(-body.angular_velocity * r.y, body.angular_velocity * r.x)
}

/// Velocity of B's contact point relative to A's
pub fn relative_velocity(a: &RigidBody, b: &RigidBody, ra: Vec2, rb: Vec2) -> Vec2 {
    point_velocity(b, rb) - point_velocity(a, ra)
}

fn effective_mass(pair: &PairProperties, ra: Vec2, rb: Vec2, direction: Vec2) -> f32 {
    let ra_cross = ra.cross(direction);
    let rb_cross = rb.cross(direction);
    pair.inv_mass_a
        + pair.inv_mass_b
        + ra_cross * ra_cross * pair.inv_inertia_a
        + rb_cross * rb_cross * pair.inv_inertia_b
}

fn prepare_contact(
    a: &RigidBody,
    b: &RigidBody,
    normal: Vec2,
    contact: &ContactPoint,
    pair: &PairProperties,
    resting_speed_sq: f32,
) -> Option<ContactConstraint> {
    let ra = contact.position - a.center();
    let rb = contact.position - b.center();
    let rv = relative_velocity(a, b, ra, rb);
    let normal_velocity = rv.dot(normal);

    // Already separating
    if normal_velocity > 0.0 {
        return None;
    }

    let k_normal = effective_mass(pair, ra, rb, normal);
    if k_normal <= 0.0 {
        return None;
    }
    let k_tangent = effective_mass(pair, ra, rb, normal.perp());

    let restitution = if rv.length_squared() < resting_speed_sq {
        0.0
    } else {
        pair.restitution
    };

    Some(ContactConstraint {
        ra,
        rb,
        normal_mass: 1.0 / k_normal,
        tangent_mass: if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 },
        target_velocity: -restitution * normal_velocity,
        normal_impulse: 0.0,
        tangent_impulse: 0.0,
    })
}

fn solve_contact(
    bodies: &mut SlotMap<BodyKey, RigidBody>,
    manifold: &Manifold,
    pair: &PairProperties,
    constraint: &mut ContactConstraint,
) {
    let normal = manifold.normal;
    let tangent = normal.perp();

    // Normal
    let Some(rv) = pair_velocity(bodies, manifold, constraint) else {
        return;
    };
    let lambda = (constraint.target_velocity - rv.dot(normal)) * constraint.normal_mass;
    let accumulated = (constraint.normal_impulse + lambda).max(0.0);
    let lambda = accumulated - constraint.normal_impulse;
    constraint.normal_impulse = accumulated;
    exchange_impulse(bodies, manifold, constraint, normal * lambda);

    // Friction
    let Some(rv) = pair_velocity(bodies, manifold, constraint) else {
        return;
    };
    let lambda = -rv.dot(tangent) * constraint.tangent_mass;
    let max_friction = pair.friction * constraint.normal_impulse;
    let accumulated = (constraint.tangent_impulse + lambda).clamp(-max_friction, max_friction);
    let lambda = accumulated - constraint.tangent_impulse;
    constraint.tangent_impulse = accumulated;
    exchange_impulse(bodies, manifold, constraint, tangent * lambda);
}

fn pair_velocity(
    bodies: &SlotMap<BodyKey, RigidBody>,
    manifold: &Manifold,
    constraint: &ContactConstraint,
) -> Option<Vec2> {
    let a = bodies.get(manifold.a)?;
    let b = bodies.get(manifold.b)?;
    Some(relative_velocity(a, b, constraint.ra, constraint.rb))
}

/// Apply `impulse` to B and its opposite to A
fn exchange_impulse(
    bodies: &mut SlotMap<BodyKey, RigidBody>,
    manifold: &Manifold,
    constraint: &ContactConstraint,
    impulse: Vec2,
) {
    if let Some(a) = bodies.get_mut(manifold.a) {
        a.apply_impulse(-impulse, constraint.ra);
    }
    if let Some(b) = bodies.get_mut(manifold.b) {
        b.apply_impulse(impulse, constraint.rb);
    }
}
