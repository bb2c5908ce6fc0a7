//! Narrow-phase collision detection for 2D shapes
//!
//! Polygon pairs use the separating axis test followed by reference/incident
//! face clipping. Circle pairs have dedicated paths. Every function reports
//! the normal pointing from the first shape toward the second.

use crate::body::BodyKey;
use crate::shapes::{Circle, Polygon, Shape};
use impulse2d_math::Vec2;

/// Relative tolerance favouring the first shape as reference body
const BIAS_RELATIVE: f32 = 0.95;
const BIAS_ABSOLUTE: f32 = 0.01;

/// One point of contact and how deep it sits inside the other shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPoint {
    /// World-space contact position
    pub position: Vec2,
    /// Penetration depth along the collision normal (non-negative)
    pub penetration: f32,
}

impl ContactPoint {
    pub fn new(position: Vec2, penetration: f32) -> Self {
        Self { position, penetration }
    }
}

/// Result of a narrow-phase test between two shapes
#[derive(Clone, Debug, PartialEq)]
pub struct Collision {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    /// One or two contact points
    pub contacts: Vec<ContactPoint>,
}

impl Collision {
    /// The same collision seen from the other shape
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// Mean penetration over all contacts
    pub fn penetration(&self) -> f32 {
        average_penetration(&self.contacts)
    }
}

/// Contact manifold between two bodies, valid for a single tick
#[derive(Clone, Debug, PartialEq)]
pub struct Manifold {
    pub a: BodyKey,
    pub b: BodyKey,
    /// Unit normal pointing from `a` toward `b`
    pub normal: Vec2,
    /// Non-empty list of contact points
    pub contacts: Vec<ContactPoint>,
}

impl Manifold {
    /// Attach a shape-level collision to the bodies it came from
    pub fn new(a: BodyKey, b: BodyKey, collision: Collision) -> Self {
        Self {
            a,
            b,
            normal: collision.normal,
            contacts: collision.contacts,
        }
    }

    /// Mean penetration over all contacts
    pub fn penetration(&self) -> f32 {
        average_penetration(&self.contacts)
    }
}

fn average_penetration(contacts: &[ContactPoint]) -> f32 {
    if contacts.is_empty() {
        return 0.0;
    }
    contacts.iter().map(|c| c.penetration).sum::<f32>() / contacts.len() as f32
}

/// Test any two shapes, dispatching on their variants
pub fn collide(a: &Shape, b: &Shape) -> Option<Collision> {
    match (a, b) {
        (Shape::Circle(ca), Shape::Circle(cb)) => circle_vs_circle(ca, cb),
        (Shape::Circle(circle), other) => {
            other.as_polygon().and_then(|polygon| circle_vs_polygon(circle, polygon))
        }
        (other, Shape::Circle(circle)) => other
            .as_polygon()
            .and_then(|polygon| circle_vs_polygon(circle, polygon))
            .map(Collision::flipped),
        _ => polygon_vs_polygon(a, b),
    }
}

/// Test circle vs circle collision
///
/// Touching circles report a single contact with zero penetration.
pub fn circle_vs_circle(a: &Circle, b: &Circle) -> Option<Collision> {
    let delta = b.center - a.center;
    let radius = a.radius + b.radius;
    let dist_sq = delta.length_squared();

    if dist_sq > radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let (normal, penetration) = if dist > 0.0 {
        (delta / dist, radius - dist)
    } else {
        // concentric: any direction separates them
        (Vec2::X, a.radius)
    };

    Some(Collision {
        normal,
        contacts: vec![ContactPoint::new(a.center + normal * a.radius, penetration)],
    })
}

/// Test circle vs polygon collision
///
/// Finds the polygon face closest to the circle center, then resolves which
/// Voronoi region (face or one of its end vertices) the center lies in. The
/// contact is offset from the center by the radius. Normal points from the
/// circle toward the polygon.
pub fn circle_vs_polygon(circle: &Circle, polygon: &Polygon) -> Option<Collision> {
    let center = circle.center;
    let radius = circle.radius;

    // Face of minimum penetration
    let mut separation = f32::MIN;
    let mut face = 0;
    for (i, (normal, vertex)) in polygon.normals().iter().zip(polygon.vertices()).enumerate() {
        let s = normal.dot(center - *vertex);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let face_normal = polygon.normals()[face];
    let (v1, v2) = polygon.edge(face);

    // Center inside the polygon
    if separation < f32::EPSILON {
        let normal = -face_normal;
        return Some(Collision {
            normal,
            contacts: vec![ContactPoint::new(center + normal * radius, radius - separation)],
        });
    }

    let vertex_region = |vertex: Vec2| -> Option<Collision> {
        let to_vertex = vertex - center;
        let dist_sq = to_vertex.length_squared();
        if dist_sq > radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > 0.0 { to_vertex / dist } else { -face_normal };
        Some(Collision {
            normal,
            contacts: vec![ContactPoint::new(vertex, radius - dist)],
        })
    };

    if (center - v1).dot(v2 - v1) <= 0.0 {
        vertex_region(v1)
    } else if (center - v2).dot(v1 - v2) <= 0.0 {
        vertex_region(v2)
    } else {
        let normal = -face_normal;
        Some(Collision {
            normal,
            contacts: vec![ContactPoint::new(center + normal * radius, radius - separation)],
        })
    }
}

/// Test polygon vs polygon collision with the separating axis theorem
///
/// Returns None as soon as either shape has a face with non-negative
/// separation. Otherwise the shape with the shallower axis provides the
/// reference face, the other the incident face, and the incident face is
/// clipped to the reference face's side planes. Up to two points remain.
pub fn polygon_vs_polygon(a: &Shape, b: &Shape) -> Option<Collision> {
    let (separation_a, face_a) = a.least_penetration(b)?;
    if separation_a >= 0.0 {
        return None;
    }

    let (separation_b, face_b) = b.least_penetration(a)?;
    if separation_b >= 0.0 {
        return None;
    }

    let (reference, incident, reference_index, flip) = if bias_greater_than(separation_a, separation_b) {
        (a, b, face_a, false)
    } else {
        (b, a, face_b, true)
    };

    let incident_index = reference.find_incident_face(incident, reference_index)?;
    let (mut face0, mut face1) = incident.as_polygon()?.edge(incident_index);
    let (v1, v2) = reference.as_polygon()?.edge(reference_index);

    let side_plane_normal = (v2 - v1).normalized();
    let reference_normal = side_plane_normal.perp();
    let reference_offset = reference_normal.dot(v1);
    let negative_side = -side_plane_normal.dot(v1);
    let positive_side = side_plane_normal.dot(v2);

    // Floating point error can leave fewer than two points
    if !clip(-side_plane_normal, negative_side, &mut face0, &mut face1) {
        return None;
    }
    if !clip(side_plane_normal, positive_side, &mut face0, &mut face1) {
        return None;
    }

    // Keep points behind the reference face
    let contacts: Vec<ContactPoint> = [face0, face1]
        .into_iter()
        .filter_map(|point| {
            let separation = reference_normal.dot(point) - reference_offset;
            (separation <= 0.0).then(|| ContactPoint::new(point, -separation))
        })
        .collect();

    if contacts.is_empty() {
        return None;
    }

    Some(Collision {
        normal: if flip { -reference_normal } else { reference_normal },
        contacts,
    })
}

fn bias_greater_than(a: f32, b: f32) -> bool {
    a >= b * BIAS_RELATIVE + a * BIAS_ABSOLUTE
}

/// Clip segment `face0..face1` to the half-plane `dot(normal, p) <= offset`
///
/// Returns false when fewer than two points survive.
fn clip(normal: Vec2, offset: f32, face0: &mut Vec2, face1: &mut Vec2) -> bool {
    let d0 = normal.dot(*face0) - offset;
    let d1 = normal.dot(*face1) - offset;

    let mut out = [*face0, *face1];
    let mut count = 0;

    if d0 <= 0.0 {
        out[count] = *face0;
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = *face1;
        count += 1;
    }

    // Endpoints on opposite sides: add the intersection
    if d0 * d1 < 0.0 && count < 2 {
        let alpha = d0 / (d0 - d1);
        out[count] = *face0 + (*face1 - *face0) * alpha;
        count += 1;
    }

    *face0 = out[0];
    *face1 = out[1];
    count == 2
}
