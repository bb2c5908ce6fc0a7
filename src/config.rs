//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`I2D_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use impulse2d_math::Vec2;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation parameters
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Bodies spawned at startup
    #[serde(default)]
    pub scene: SceneConfig,
    /// Headless run settings
    #[serde(default)]
    pub run: RunConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`I2D_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // I2D_RUN__DURATION_SECS=5 -> run.duration_secs = 5
        figment = figment.merge(Env::prefixed("I2D_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Gravity [x, y] in position units per tick (positive y = down)
    pub gravity: [f32; 2],
    /// Fixed tick rate
    pub ticks_per_second: u32,
    /// Impulse solver passes per tick
    pub solver_iterations: u32,
    /// Fraction of penetration corrected per tick
    pub correction_percent: f32,
    /// Penetration tolerated without correction
    pub correction_slop: f32,
    /// Most ticks run for a single frame; older backlog is dropped
    pub max_catch_up_ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 2.0],
            ticks_per_second: 120,
            solver_iterations: 10,
            correction_percent: 0.4,
            correction_slop: 0.05,
            max_catch_up_ticks: 240,
        }
    }
}

impl SimulationConfig {
    /// Convert to the physics engine's config type
    pub fn to_physics_config(&self) -> impulse2d_physics::PhysicsConfig {
        impulse2d_physics::PhysicsConfig {
            gravity: Vec2::from(self.gravity),
            ticks_per_second: self.ticks_per_second.max(1),
            solver_iterations: self.solver_iterations.max(1),
            correction_percent: self.correction_percent.clamp(0.0, 1.0),
            correction_slop: self.correction_slop.max(0.0),
        }
    }
}

fn default_density() -> f32 {
    1.0
}

/// Static floor spanned by two corners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorConfig {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

/// A circle spawned at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircleConfig {
    pub center: [f32; 2],
    pub radius: f32,
    #[serde(default = "default_density")]
    pub density: f32,
    /// Initial velocity [x, y] per tick
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub is_static: bool,
}

/// An axis-aligned box spawned at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxConfig {
    pub min: [f32; 2],
    pub max: [f32; 2],
    #[serde(default = "default_density")]
    pub density: f32,
    /// Initial rotation in radians
    #[serde(default)]
    pub angle: f32,
    /// Initial velocity [x, y] per tick
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub is_static: bool,
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Floor; omit for an open scene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<FloorConfig>,
    #[serde(default)]
    pub circles: Vec<CircleConfig>,
    #[serde(default)]
    pub boxes: Vec<BoxConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            floor: Some(FloorConfig {
                min: [100.0, 1200.0],
                max: [1500.0, 1300.0],
            }),
            circles: vec![CircleConfig {
                center: [200.0, 1100.0],
                radius: 50.0,
                density: 1.0,
                velocity: [0.0, 0.0],
                is_static: false,
            }],
            boxes: Vec::new(),
        }
    }
}

/// Headless run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Simulated wall-clock length of the run in seconds
    pub duration_secs: f32,
    /// Frames per second at which the stepper is polled
    pub frame_rate: u32,
    /// Start with the simulation paused
    pub start_paused: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            frame_rate: 60,
            start_paused: false,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Report contact points with each frame
    pub show_contacts: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_contacts: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.gravity, [0.0, 2.0]);
        assert_eq!(config.simulation.ticks_per_second, 120);
        assert_eq!(config.scene.circles.len(), 1);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_to_physics_config() {
        let physics = SimulationConfig::default().to_physics_config();
        assert_eq!(physics, impulse2d_physics::PhysicsConfig::default());
    }

    #[test]
    fn test_to_physics_config_guards_values() {
        let config = SimulationConfig {
            ticks_per_second: 0,
            solver_iterations: 0,
            correction_percent: 3.0,
            correction_slop: -1.0,
            ..SimulationConfig::default()
        };
        let physics = config.to_physics_config();
        assert_eq!(physics.ticks_per_second, 1);
        assert_eq!(physics.solver_iterations, 1);
        assert_eq!(physics.correction_percent, 1.0);
        assert_eq!(physics.correction_slop, 0.0);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("gravity"));
        assert!(toml.contains("ticks_per_second"));
        assert!(toml.contains("radius"));
    }

    #[test]
    fn test_scene_defaults_fill_in() {
        let scene: SceneConfig = toml::from_str(
            r#"
            [[circles]]
            center = [10.0, 20.0]
            radius = 5.0
            "#,
        )
        .unwrap();
        assert!(scene.floor.is_none());
        assert_eq!(scene.circles[0].density, 1.0);
        assert!(!scene.circles[0].is_static);
        assert!(scene.boxes.is_empty());
    }
}
