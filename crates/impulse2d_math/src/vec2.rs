//! 2D Vector type
//!
//! Operators (`+`, `-`, `*`, `/`, unary `-`) and the `*ed`-style methods
//! return new values. The compound-assignment operators and the verb-style
//! methods (`normalize`, `rotate_about_point`, `negate`, `set`, `add_scalar`)
//! mutate in place.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};

/// 2D Vector with x and y components
///
/// Coordinates follow screen conventions (y grows downward), but nothing in
/// the algebra depends on that.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new Vec2
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product)
    #[inline]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Cross of a scalar pseudo-vector with a vector: `(s * v.y, -s * v.x)`
    #[inline]
    pub fn scalar_cross(s: f32, v: Self) -> Self {
        Self::new(s * v.y, -s * v.x)
    }

    /// Perpendicular vector `(y, -x)`, the outward normal of an edge with positive winding
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// Length squared (faster than length)
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length (magnitude)
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance between two points
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction; a zero vector is returned unchanged
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self / len
        } else {
            self
        }
    }

    /// Normalize in place; no-op on a zero vector
    #[inline]
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// This point rotated by `angle` radians around `pivot`
    #[inline]
    pub fn rotated_about_point(self, pivot: Self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let d = self - pivot;
        Self::new(
            cos * d.x - sin * d.y + pivot.x,
            sin * d.x + cos * d.y + pivot.y,
        )
    }

    /// Rotate this point in place by `angle` radians around `pivot`
    #[inline]
    pub fn rotate_about_point(&mut self, pivot: Self, angle: f32) {
        *self = self.rotated_about_point(pivot, angle);
    }

    /// Negate in place
    #[inline]
    pub fn negate(&mut self) {
        *self = -*self;
    }

    /// Overwrite both components
    #[inline]
    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// This vector with `scalar` added to both components
    #[inline]
    pub fn offset_scalar(self, scalar: f32) -> Self {
        Self::new(self.x + scalar, self.y + scalar)
    }

    /// Add `scalar` to both components in place
    #[inline]
    pub fn add_scalar(&mut self, scalar: f32) {
        *self = self.offset_scalar(scalar);
    }

    /// Component-wise multiplication (Hadamard product)
    #[inline]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Linear interpolation between two vectors
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Whether both components are finite
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// Operator overloads

impl std::ops::Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl std::ops::MulAssign<f32> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, scalar: f32) {
        self.x *= scalar;
        self.y *= scalar;
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn div(self, scalar: f32) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }
}

impl std::ops::DivAssign<f32> for Vec2 {
    #[inline]
    fn div_assign(&mut self, scalar: f32) {
        self.x /= scalar;
        self.y /= scalar;
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    #[inline]
    fn from(a: [f32; 2]) -> Self {
        Self::new(a[0], a[1])
    }
}

impl From<Vec2> for [f32; 2] {
    #[inline]
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}
