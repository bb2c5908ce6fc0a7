//! Named scalar body properties editable from outside the simulation

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use crate::error::PhysicsError;

/// The recognized set of externally editable scalars
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyProperty {
    Angle,
    Density,
    Restitution,
    Friction,
    Red,
    Green,
    Blue,
    Alpha,
}

impl BodyProperty {
    /// All properties in display order
    pub const ALL: [BodyProperty; 8] = [
        BodyProperty::Angle,
        BodyProperty::Density,
        BodyProperty::Restitution,
        BodyProperty::Friction,
        BodyProperty::Red,
        BodyProperty::Green,
        BodyProperty::Blue,
        BodyProperty::Alpha,
    ];

    /// Lowercase name as used by the editing layer
    pub fn name(self) -> &'static str {
        match self {
            BodyProperty::Angle => "angle",
            BodyProperty::Density => "density",
            BodyProperty::Restitution => "restitution",
            BodyProperty::Friction => "friction",
            BodyProperty::Red => "red",
            BodyProperty::Green => "green",
            BodyProperty::Blue => "blue",
            BodyProperty::Alpha => "alpha",
        }
    }

    /// Inclusive range accepted for the property
    pub fn range(self) -> (f32, f32) {
        match self {
            BodyProperty::Angle => (0.0, TAU),
            BodyProperty::Density => (0.1, 10.0),
            BodyProperty::Restitution | BodyProperty::Friction | BodyProperty::Alpha => (0.0, 1.0),
            BodyProperty::Red | BodyProperty::Green | BodyProperty::Blue => (0.0, 255.0),
        }
    }

    /// Clamp a requested value into range; color channels snap to integers
    pub fn sanitize(self, value: f32) -> f32 {
        let (min, max) = self.range();
        let clamped = value.clamp(min, max);
        match self {
            BodyProperty::Red | BodyProperty::Green | BodyProperty::Blue => clamped.round(),
            _ => clamped,
        }
    }
}

impl fmt::Display for BodyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyProperty {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyProperty::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PhysicsError::UnknownProperty(s.to_string()))
    }
}
