//! Collision shapes for 2D physics
//!
//! A closed set of variants dispatched by `match`: circles, rectangles and
//! general convex polygons. Every variant answers the same questions (area,
//! inertia, normals, containment, support point) with its own math.

use std::f32::consts::PI;
use std::fmt;

use crate::error::PhysicsError;
use impulse2d_math::Vec2;

/// Fixed rotational inertia for circles (not derived from the radius)
pub const CIRCLE_MOMENT_OF_INERTIA: f32 = 4_000_000.0;

/// Fixed rotational inertia for rectangles (not derived from the extents)
pub const RECTANGLE_MOMENT_OF_INERTIA: f32 = 100_000_000.0;

/// Polygons with less area than this are rejected as degenerate
const MIN_AREA: f32 = 1e-6;

/// Largest inward turn (as a sine) still accepted between consecutive edges
const CONVEXITY_TOLERANCE: f32 = 1e-4;

/// Relative slack on the reference area for triangle-fan containment
const CONTAINS_TOLERANCE: f64 = 1e-4;

/// Shape variant tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        };
        f.write_str(name)
    }
}

/// A circle defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Create a new circle, rejecting non-positive or non-finite radii
    pub fn new(center: Vec2, radius: f32) -> Result<Self, PhysicsError> {
        if !center.is_finite() {
            return Err(PhysicsError::InvalidShape(format!("circle center {:?} is not finite", center)));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidShape(format!("circle radius must be positive, got {}", radius)));
        }
        Ok(Self { center, radius })
    }

    /// Strict containment: points on the rim are outside
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) < self.radius
    }
}

/// A convex polygon with positive winding and cached outward edge normals
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Create a polygon from at least three vertices
    ///
    /// Vertices given with negative winding are reversed so that edge normals
    /// point outward.
    pub fn new(mut vertices: Vec<Vec2>) -> Result<Self, PhysicsError> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if let Some(v) = vertices.iter().find(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidShape(format!("vertex {:?} is not finite", v)));
        }

        let signed = signed_area(&vertices);
        if signed.abs() < MIN_AREA {
            return Err(PhysicsError::InvalidShape("polygon has zero area".to_string()));
        }
        if signed < 0.0 {
            vertices.reverse();
        }
        if let Some(corner) = reflex_corner(&vertices) {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon is not convex at vertex {:?}",
                vertices[corner]
            )));
        }

        let mut polygon = Self { vertices, normals: Vec::new() };
        polygon.compute_normals();
        Ok(polygon)
    }

    /// Vertices in winding order
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Unit outward normal of each edge `i -> i+1`
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// The edge starting at vertex `index`
    pub fn edge(&self, index: usize) -> (Vec2, Vec2) {
        let n = self.vertices.len();
        (self.vertices[index % n], self.vertices[(index + 1) % n])
    }

    /// Arithmetic mean of the vertices
    pub fn centroid(&self) -> Vec2 {
        let sum = self.vertices.iter().fold(Vec2::ZERO, |acc, v| acc + *v);
        sum / self.vertices.len() as f32
    }

    /// Area via the shoelace formula
    pub fn area(&self) -> f32 {
        signed_area(&self.vertices).abs()
    }

    /// Rotational inertia of a uniform-density polygon about its centroid
    pub fn moment_of_inertia(&self, density: f32) -> f32 {
        let c = self.centroid();
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let p0 = self.vertices[i] - c;
            let p1 = self.vertices[(i + 1) % n] - c;
            let cross = p0.cross(p1);
            sum += cross * (p0.dot(p0) + p0.dot(p1) + p1.dot(p1));
        }
        density * sum.abs() / 12.0
    }

    /// Triangle-fan containment against a reference area
    ///
    /// The point is inside when the triangles it forms with every edge add up
    /// to no more than `area`. The fan is summed in f64 and both sides are
    /// floored after a small relative slack, so a rotated body whose cached
    /// area drifted from its vertices still contains its own centroid.
    pub fn fan_contains(&self, point: Vec2, area: f32) -> bool {
        let n = self.vertices.len();
        let total: f64 = (0..n)
            .map(|i| triangle_area(self.vertices[i], point, self.vertices[(i + 1) % n]))
            .sum();
        let reference = f64::from(area);
        total.floor() <= (reference + reference * CONTAINS_TOLERANCE).floor()
    }

    /// Vertex maximizing `dot(vertex, direction)`; the first one wins ties
    pub fn support(&self, direction: Vec2) -> Vec2 {
        support_of(&self.vertices, direction)
    }

    /// Shift every vertex
    pub fn translate(&mut self, delta: Vec2) {
        for v in &mut self.vertices {
            *v += delta;
        }
    }

    /// Rotate every vertex about the centroid, then refresh normals
    pub fn rotate(&mut self, delta: f32) {
        let pivot = self.centroid();
        for v in &mut self.vertices {
            v.rotate_about_point(pivot, delta);
        }
        self.compute_normals();
    }

    fn compute_normals(&mut self) {
        let n = self.vertices.len();
        self.normals = (0..n)
            .map(|i| (self.vertices[(i + 1) % n] - self.vertices[i]).normalized().perp())
            .collect();
    }
}

/// Closed set of body shapes
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Polygon),
    Polygon(Polygon),
}

impl Shape {
    /// A circle shape
    pub fn circle(center: Vec2, radius: f32) -> Result<Self, PhysicsError> {
        Ok(Shape::Circle(Circle::new(center, radius)?))
    }

    /// A rectangle from exactly four vertices in winding order
    pub fn rectangle(vertices: Vec<Vec2>) -> Result<Self, PhysicsError> {
        if vertices.len() != 4 {
            return Err(PhysicsError::InvalidShape(format!(
                "rectangle needs 4 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Shape::Rectangle(Polygon::new(vertices)?))
    }

    /// An axis-aligned rectangle spanned by two opposite corners, dragged in any direction
    pub fn rectangle_from_corners(anchor: Vec2, corner: Vec2) -> Result<Self, PhysicsError> {
        let vertices = if (corner.x - anchor.x) * (corner.y - anchor.y) > 0.0 {
            vec![
                anchor,
                Vec2::new(corner.x, anchor.y),
                corner,
                Vec2::new(anchor.x, corner.y),
            ]
        } else {
            vec![
                anchor,
                Vec2::new(anchor.x, corner.y),
                corner,
                Vec2::new(corner.x, anchor.y),
            ]
        };
        Self::rectangle(vertices)
    }

    /// A general convex polygon
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, PhysicsError> {
        Ok(Shape::Polygon(Polygon::new(vertices)?))
    }

    /// The variant tag
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// The polygon geometry, if this is not a circle
    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Shape::Circle(_) => None,
            Shape::Rectangle(p) | Shape::Polygon(p) => Some(p),
        }
    }

    /// Vertex list; a circle has exactly one vertex, its center
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            Shape::Circle(c) => std::slice::from_ref(&c.center),
            Shape::Rectangle(p) | Shape::Polygon(p) => p.vertices(),
        }
    }

    /// Edge normals; empty for circles
    pub fn normals(&self) -> &[Vec2] {
        match self {
            Shape::Circle(_) => &[],
            Shape::Rectangle(p) | Shape::Polygon(p) => p.normals(),
        }
    }

    /// Center of mass (vertex mean for polygons)
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle(c) => c.center,
            Shape::Rectangle(p) | Shape::Polygon(p) => p.centroid(),
        }
    }

    /// Radius for circles
    pub fn radius(&self) -> Option<f32> {
        match self {
            Shape::Circle(c) => Some(c.radius),
            _ => None,
        }
    }

    /// Surface area
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle(c) => PI * c.radius * c.radius,
            Shape::Rectangle(p) => {
                let v = p.vertices();
                v[0].distance(v[1]) * v[1].distance(v[2])
            }
            Shape::Polygon(p) => p.area(),
        }
    }

    /// Rotational inertia for a body of the given density
    pub fn moment_of_inertia(&self, density: f32) -> f32 {
        match self {
            Shape::Circle(_) => CIRCLE_MOMENT_OF_INERTIA,
            Shape::Rectangle(_) => RECTANGLE_MOMENT_OF_INERTIA,
            Shape::Polygon(p) => p.moment_of_inertia(density),
        }
    }

    /// Point containment test used for hit-testing
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle(c) => c.contains(point),
            Shape::Rectangle(p) | Shape::Polygon(p) => p.fan_contains(point, self.area()),
        }
    }

    /// Support point in `direction`; circles return their center without a radius offset
    pub fn support(&self, direction: Vec2) -> Vec2 {
        support_of(self.vertices(), direction)
    }

    /// Shift the shape
    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Circle(c) => c.center += delta,
            Shape::Rectangle(p) | Shape::Polygon(p) => p.translate(delta),
        }
    }

    /// Rotate geometry about the center of mass; circles are rotation invariant
    pub fn rotate(&mut self, delta: f32) {
        match self {
            Shape::Circle(_) => {}
            Shape::Rectangle(p) | Shape::Polygon(p) => p.rotate(delta),
        }
    }

    /// Own face along which `other` is least deep, with its signed separation
    ///
    /// For each own edge, `other`'s support point against the edge normal is
    /// measured from the edge. The largest value wins; a positive value means
    /// that face separates the shapes. `None` for circles, which have no faces.
    pub fn least_penetration(&self, other: &Shape) -> Option<(f32, usize)> {
        let polygon = self.as_polygon()?;
        let mut best: Option<(f32, usize)> = None;

        for (i, (normal, vertex)) in polygon.normals().iter().zip(polygon.vertices()).enumerate() {
            let support = other.support(-*normal);
            let distance = normal.dot(support - *vertex);
            if best.map_or(true, |(d, _)| distance > d) {
                best = Some((distance, i));
            }
        }

        best
    }

    /// Face of `other` most anti-parallel to this shape's `reference_face`
    pub fn find_incident_face(&self, other: &Shape, reference_face: usize) -> Option<usize> {
        let reference_normal = *self.normals().get(reference_face)?;
        other
            .normals()
            .iter()
            .enumerate()
            .fold(None, |best: Option<(f32, usize)>, (i, n)| {
                let dot = reference_normal.dot(*n);
                match best {
                    Some((min, _)) if min <= dot => best,
                    _ => Some((dot, i)),
                }
            })
            .map(|(_, i)| i)
    }
}

fn support_of(vertices: &[Vec2], direction: Vec2) -> Vec2 {
    let mut best = vertices[0];
    let mut best_projection = best.dot(direction);
    for v in &vertices[1..] {
        let projection = v.dot(direction);
        if projection > best_projection {
            best_projection = projection;
            best = *v;
        }
    }
    best
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    let twice: f32 = (0..n).map(|i| vertices[i].cross(vertices[(i + 1) % n])).sum();
    twice * 0.5
}

fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (ux, uy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);
    let (vx, vy) = (f64::from(c.x) - ax, f64::from(c.y) - ay);
    (ux * vy - uy * vx).abs() * 0.5
}

/// Index of the first vertex where a positively wound outline turns inward
fn reflex_corner(vertices: &[Vec2]) -> Option<usize> {
    let n = vertices.len();
    (0..n).find_map(|i| {
        let prev = vertices[(i + n - 1) % n];
        let here = vertices[i];
        let next = vertices[(i + 1) % n];
        let incoming = here - prev;
        let outgoing = next - here;
        let turn = incoming.cross(outgoing);
        let scale = incoming.length() * outgoing.length();
        (turn < -CONVEXITY_TOLERANCE * scale).then_some(i)
    })
}
