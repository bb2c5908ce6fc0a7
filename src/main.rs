//! impulse2d - 2D rigid-body physics sandbox
//!
//! Headless runner: builds the configured scene and drives it in simulated
//! real time, logging what a renderer would draw.

use std::time::{Duration, Instant};

use impulse2d::config::AppConfig;
use impulse2d::scene::SceneBuilder;
use impulse2d::systems::SimulationSystem;
use impulse2d_physics::{PhysicsWorld, WorldSnapshot};

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    world: PhysicsWorld,
    simulation: SimulationSystem,
    start: Instant,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let world = SceneBuilder::from_config(&config)
            .map(SceneBuilder::build)
            .unwrap_or_else(|e| {
                log::warn!("Failed to build configured scene: {}. Starting empty.", e);
                PhysicsWorld::with_config(config.simulation.to_physics_config())
            });

        let start = Instant::now();
        let simulation = SimulationSystem::from_config(&config.simulation, start);

        log::info!(
            "Simulating {} bodies at {} ticks/s",
            world.body_count(),
            world.config().ticks_per_second
        );

        Self {
            config,
            world,
            simulation,
            start,
        }
    }

    /// Step through the configured duration frame by frame
    ///
    /// Time is simulated rather than slept so a run is reproducible.
    fn run(&mut self) {
        let frame_rate = self.config.run.frame_rate.max(1);
        let frame = Duration::from_secs(1) / frame_rate;
        let frames = (self.config.run.duration_secs.max(0.0) * frame_rate as f32).round() as u64;

        let mut dropped = 0;
        for index in 1..=frames {
            let now = self.start + frame * index as u32;
            let result = self.simulation.update(&mut self.world, now);
            dropped += result.ticks_dropped;

            if index % u64::from(frame_rate) == 0 {
                self.report(&self.world.snapshot());
            }
        }

        log::info!(
            "Finished after {} ticks ({} dropped), {} manifold(s) in the last tick",
            self.world.tick_index(),
            dropped,
            self.world.manifolds().len()
        );
    }

    fn report(&self, snapshot: &WorldSnapshot) {
        log::info!("Tick {}{}", snapshot.tick_index, if snapshot.paused { " (paused)" } else { "" });
        for body in &snapshot.bodies {
            log::info!(
                "  {} at ({:.2}, {:.2}) angle {:.3}",
                body.kind,
                body.center.x,
                body.center.y,
                body.angle
            );
        }
        for contact in &snapshot.contacts {
            log::debug!("  contact at ({:.2}, {:.2})", contact.x, contact.y);
        }
    }
}

fn main() {
    let loaded = AppConfig::load();
    let log_level = loaded
        .as_ref()
        .map(|config| config.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging; RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
    log::info!("Starting impulse2d");

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let mut app = App::new(config);
    app.run();
}
