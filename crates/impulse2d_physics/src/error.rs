//! Physics error types
//!
//! Numerical degeneracies (zero-length vectors, infinite mass) are never
//! errors. These cover caller precondition violations only.

use std::fmt;

/// Error type for body construction and external edits
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Geometry that cannot describe the requested shape variant
    InvalidShape(String),
    /// A property name outside the recognized set
    UnknownProperty(String),
    /// An edit referenced a body that is no longer in the world
    BodyNotFound,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::InvalidShape(msg) => write!(f, "Invalid shape: {}", msg),
            PhysicsError::UnknownProperty(name) => write!(f, "Unknown body property: {}", name),
            PhysicsError::BodyNotFound => write!(f, "Body not found"),
        }
    }
}

impl std::error::Error for PhysicsError {}
