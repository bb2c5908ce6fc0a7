//! Read-only view of the world for a renderer
//!
//! A snapshot owns copies of everything it reports so a frame can be drawn
//! while the world keeps ticking.

use crate::body::{Appearance, BodyKey};
use crate::shapes::ShapeKind;
use crate::world::PhysicsWorld;
use impulse2d_math::Vec2;

/// One body as the renderer sees it
#[derive(Clone, Debug, PartialEq)]
pub struct BodyView {
    pub key: BodyKey,
    pub kind: ShapeKind,
    /// Polygon vertices in winding order; a circle reports its center only
    pub vertices: Vec<Vec2>,
    pub center: Vec2,
    /// Set for circles only
    pub radius: Option<f32>,
    pub angle: f32,
    pub appearance: Appearance,
}

impl BodyView {
    /// Vertices as a flat `[x0, y0, x1, y1, ...]` slice for vertex buffers
    pub fn vertex_data(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Everything needed to draw one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    pub tick_index: u64,
    pub paused: bool,
    /// Bodies in insertion (draw) order
    pub bodies: Vec<BodyView>,
    /// Contact positions from the last tick; empty unless debug is on
    pub contacts: Vec<Vec2>,
}

impl WorldSnapshot {
    pub fn capture(world: &PhysicsWorld) -> Self {
        let bodies = world
            .bodies()
            .map(|(key, body)| BodyView {
                key,
                kind: body.kind(),
                vertices: body.vertices().to_vec(),
                center: body.center(),
                radius: body.radius(),
                angle: body.angle(),
                appearance: body.appearance,
            })
            .collect();

        let contacts = if world.is_debug() {
            world
                .manifolds()
                .iter()
                .flat_map(|m| m.contacts.iter().map(|c| c.position))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            tick_index: world.tick_index(),
            paused: world.is_paused(),
            bodies,
            contacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::RigidBody;

    fn resting_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        world.add_body(
            RigidBody::rectangle_from_corners(Vec2::new(100.0, 1200.0), Vec2::new(1500.0, 1300.0))
                .unwrap()
                .with_static(),
        );
        world.add_body(RigidBody::circle(Vec2::new(200.0, 1152.0), 50.0).unwrap());
        world
    }

    #[test]
    fn test_snapshot_lists_bodies_in_order() {
        let mut world = resting_world();
        world.tick();
        let snapshot = world.snapshot();

        assert_eq!(snapshot.tick_index, 1);
        assert!(!snapshot.paused);
        assert_eq!(snapshot.bodies.len(), 2);
        assert_eq!(snapshot.bodies[0].kind, ShapeKind::Rectangle);
        assert_eq!(snapshot.bodies[0].vertices.len(), 4);
        assert_eq!(snapshot.bodies[0].radius, None);
        assert_eq!(snapshot.bodies[1].kind, ShapeKind::Circle);
        assert_eq!(snapshot.bodies[1].radius, Some(50.0));
    }

    #[test]
    fn test_contacts_only_in_debug() {
        let mut world = resting_world();
        world.tick();
        assert!(world.snapshot().contacts.is_empty());

        world.set_debug(true);
        let contacts = world.snapshot().contacts;
        assert_eq!(contacts.len(), 1);
        assert!((contacts[0].y - 1202.0).abs() < 0.1);
    }

    #[test]
    fn test_vertex_data_is_flat() {
        let world = resting_world();
        let snapshot = world.snapshot();
        let data = snapshot.bodies[0].vertex_data();
        assert_eq!(data.len(), 8);
        assert_eq!(&data[..2], &[100.0, 1200.0]);
    }
}
