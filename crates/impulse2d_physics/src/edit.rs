//! Deferred body edits from the interaction layer
//!
//! Edits are queued on the world and applied at the start of the next tick,
//! whether or not the simulation is paused.

use crate::body::BodyKey;
use crate::property::BodyProperty;
use impulse2d_math::Vec2;

/// A change to an existing body
#[derive(Clone, Debug, PartialEq)]
pub enum BodyEdit {
    /// Give the body infinite mass
    SetStatic(BodyKey),
    /// Move the body by an offset (dragging)
    Translate(BodyKey, Vec2),
    /// Set a named scalar; the value is clamped to the property's range
    SetProperty(BodyKey, BodyProperty, f32),
    /// Take the body out of the simulation
    Remove(BodyKey),
}

impl BodyEdit {
    /// The body this edit targets
    pub fn key(&self) -> BodyKey {
        match self {
            BodyEdit::SetStatic(key)
            | BodyEdit::Translate(key, _)
            | BodyEdit::SetProperty(key, _, _)
            | BodyEdit::Remove(key) => *key,
        }
    }
}
