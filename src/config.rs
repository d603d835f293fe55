//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`PB_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use pushball_character::CharacterConfig;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Character tunables
    #[serde(default)]
    pub character: CharacterConfig,
    /// Scene names and loading
    #[serde(default)]
    pub scenes: ScenesConfig,
    /// Headless session length
    #[serde(default)]
    pub simulation: SimulationConfig,
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
    /// 3. Environment variables (`PB_*`)
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

        // Optional
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // PB_SCENES__FIRST_LEVEL=Level2 -> scenes.first_level = "Level2"
        figment = figment.merge(Env::prefixed("PB_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Gravity (negative = downward)
    pub gravity: f32,
    /// Fixed physics step in seconds
    pub fixed_timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            fixed_timestep: 1.0 / 50.0,
        }
    }
}

impl PhysicsConfig {
    /// Convert to the physics engine's config
    pub fn to_physics_config(&self) -> pushball_physics::PhysicsConfig {
        pushball_physics::PhysicsConfig::new(self.gravity)
    }
}

/// Scene names used by the game flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenesConfig {
    /// Scene shown at startup
    pub main_menu: String,
    /// Loading screen shown during transitions
    pub transition_scene: String,
    /// Scene the start button loads
    pub first_level: String,
    /// Frames the first level takes to load
    pub load_steps: u32,
}

impl Default for ScenesConfig {
    fn default() -> Self {
        Self {
            main_menu: "MainMenu".to_string(),
            transition_scene: "Loading".to_string(),
            first_level: "Level1".to_string(),
            load_steps: 30,
        }
    }
}

/// Headless session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Frames to run before exiting
    pub frames: u32,
    /// Simulated frame time in seconds
    pub frame_dt: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_dt: 1.0 / 60.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
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
