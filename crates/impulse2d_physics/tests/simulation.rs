//! End-to-end simulation scenarios
//!
//! These drive a full world (or the pipeline phases directly, in the same
//! order as `PhysicsWorld::tick`) and check physical outcomes.

use impulse2d_math::Vec2;
use impulse2d_physics::pipeline::relative_velocity;
use impulse2d_physics::{
    collide, BodyKey, CollisionPipeline, PhysicsConfig, PhysicsWorld, RigidBody, AIR_RESISTANCE,
};
use slotmap::SlotMap;

fn floor() -> RigidBody {
    RigidBody::rectangle(vec![
        Vec2::new(100.0, 1200.0),
        Vec2::new(1500.0, 1200.0),
        Vec2::new(1500.0, 1300.0),
        Vec2::new(100.0, 1300.0),
    ])
    .unwrap()
    .with_static()
}

fn falling_box() -> RigidBody {
    RigidBody::rectangle_from_corners(Vec2::new(700.0, 1090.0), Vec2::new(900.0, 1190.0)).unwrap()
}

fn lowest_y(body: &RigidBody) -> f32 {
    body.vertices().iter().map(|v| v.y).fold(f32::MIN, f32::max)
}

#[test]
fn test_box_lands_without_approach_after_impulses() {
    let config = PhysicsConfig::default();
    let pipeline = CollisionPipeline::from_config(&config);
    let dt = config.dt();

    let mut bodies: SlotMap<BodyKey, RigidBody> = SlotMap::with_key();
    let order = vec![bodies.insert(floor()), bodies.insert(falling_box())];
    let box_key = order[1];

    assert_eq!(bodies[box_key].mass(), 200.0 * 100.0);

    let mut contact_ticks = 0;
    let mut previous_velocity = 0.0_f32;

    for _ in 0..600 {
        let manifolds = pipeline.detect(&bodies, &order);

        if manifolds.is_empty() && contact_ticks == 0 {
            // free fall: gravity step then damping, every tick
            let v = bodies[box_key].velocity.y;
            assert!((v - previous_velocity).abs() < 1e-4 || v > previous_velocity);
        }

        pipeline.apply_impulses(&mut bodies, &manifolds, config.gravity_step());

        for manifold in &manifolds {
            contact_ticks += 1;
            let a = &bodies[manifold.a];
            let b = &bodies[manifold.b];
            for contact in &manifold.contacts {
                let rv = relative_velocity(a, b, contact.position - a.center(), contact.position - b.center());
                assert!(
                    rv.dot(manifold.normal) >= -1e-3,
                    "contact still approaching: {}",
                    rv.dot(manifold.normal)
                );
            }
        }

        for key in &order {
            bodies[*key].tick(dt, config.gravity);
        }
        pipeline.positional_correction(&mut bodies, &manifolds);

        previous_velocity = bodies[box_key].velocity.y;
    }

    assert!(contact_ticks > 0, "box never reached the floor");

    // Settled on the floor with little residual penetration
    let bottom = lowest_y(&bodies[box_key]);
    assert!(bottom > 1199.0, "box floating at {}", bottom);
    assert!(bottom - 1200.0 < 0.5, "box sank to {}", bottom);
    assert!(bodies[box_key].velocity.length() < 0.05);
}

#[test]
fn test_free_fall_velocity_per_tick() {
    let mut world = PhysicsWorld::new();
    let key = world.add_body(falling_box());
    let step = world.config().gravity_step().y;

    let mut expected = 0.0_f32;
    for _ in 0..20 {
        world.tick();
        expected = (expected + step) * AIR_RESISTANCE;
        let v = world.get_body(key).unwrap().velocity.y;
        assert!((v - expected).abs() < 1e-5);
    }
}

#[test]
fn test_world_settles_box_on_floor() {
    let mut world = PhysicsWorld::new();
    world.add_body(floor());
    let key = world.add_body(falling_box());

    for _ in 0..900 {
        world.tick();
    }

    assert_eq!(world.tick_index(), 900);
    let manifolds = world.manifolds();
    assert_eq!(manifolds.len(), 1);
    assert!(manifolds[0].penetration() < 0.5);

    let body = world.get_body(key).unwrap();
    let bottom = lowest_y(body);
    assert!(bottom > 1199.0 && bottom < 1200.5);
    // stays over the same stretch of floor
    assert!((body.center().x - 800.0).abs() < 5.0);
}

#[test]
fn test_static_bodies_never_move() {
    let mut world = PhysicsWorld::new();
    let left = world.add_body(
        RigidBody::rectangle_from_corners(Vec2::new(100.0, 1200.0), Vec2::new(800.0, 1300.0))
            .unwrap()
            .with_static(),
    );
    let right = world.add_body(
        RigidBody::rectangle_from_corners(Vec2::new(700.0, 1180.0), Vec2::new(1500.0, 1280.0))
            .unwrap()
            .with_static(),
    );
    world.add_body(RigidBody::circle(Vec2::new(750.0, 1000.0), 40.0).unwrap());

    let left_before = world.get_body(left).unwrap().vertices().to_vec();
    let right_before = world.get_body(right).unwrap().vertices().to_vec();

    for _ in 0..400 {
        world.tick();
    }

    assert_eq!(world.get_body(left).unwrap().vertices(), left_before.as_slice());
    assert_eq!(world.get_body(right).unwrap().vertices(), right_before.as_slice());
    // the static pair itself never shows up as a manifold
    assert!(world
        .manifolds()
        .iter()
        .all(|m| !(m.a == left && m.b == right)));
}

#[test]
fn test_circle_reaches_floor_with_single_contact() {
    let ground = floor();
    let ball = RigidBody::circle(Vec2::new(200.0, 1100.0), 50.0).unwrap();
    assert!(collide(ground.shape(), ball.shape()).is_none());

    let mut world = PhysicsWorld::new();
    world.add_body(ground);
    let key = world.add_body(ball);

    let mut first_contact = None;
    for tick in 0..300 {
        world.tick();
        if !world.manifolds().is_empty() {
            first_contact = Some(tick);
            break;
        }
    }

    assert!(first_contact.is_some(), "circle never touched the floor");
    let manifolds = world.manifolds();
    assert_eq!(manifolds.len(), 1);
    assert_eq!(manifolds[0].contacts.len(), 1);
    assert_eq!(manifolds[0].b, key);
    // the contact sits on the floor's top edge, under the circle
    let contact = manifolds[0].contacts[0].position;
    assert!((contact.x - 200.0).abs() < 1e-2);
    assert!(contact.y >= 1200.0 && contact.y < 1202.0);
}

#[test]
fn test_pause_freezes_and_resumes() {
    let mut world = PhysicsWorld::new();
    world.add_body(floor());
    let key = world.add_body(falling_box());

    for _ in 0..10 {
        world.tick();
    }
    world.pause();
    let frozen = world.get_body(key).unwrap().center();

    for _ in 0..10 {
        world.tick();
    }
    assert_eq!(world.tick_index(), 20);
    assert_eq!(world.get_body(key).unwrap().center(), frozen);

    world.resume();
    world.tick();
    assert!(world.get_body(key).unwrap().center().y > frozen.y);
}
