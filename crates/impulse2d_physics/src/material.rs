//! Physical material properties for collision response

/// Physical material properties for collision response
///
/// Materials define how bodies interact during collisions: friction (how much
/// they resist sliding) and restitution (bounciness).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsMaterial {
    /// Coulomb friction coefficient (0.0 = frictionless)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.1,
            restitution: 0.4,
        }
    }
}

impl PhysicsMaterial {
    /// Create a new physics material
    ///
    /// Restitution is clamped to [0.0, 1.0], friction to non-negative values.
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Combine two materials for collision response
    ///
    /// Geometric mean for friction and minimum for restitution (the least
    /// bouncy surface wins).
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.min(other.restitution),
        }
    }
}
