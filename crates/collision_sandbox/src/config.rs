//! Sandbox configuration

use serde::{Deserialize, Serialize};

use engine2d::config::{Config, PhysicsConfig};

/// Settings for a sandbox run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Number of frames to simulate
    pub frames: u32,

    /// Distance the ship tries to travel each frame
    pub ship_speed: f32,

    /// Ship rotation per frame, in degrees
    pub ship_turn_degrees: f32,

    /// Length of the turret's sight line
    pub sight_range: f32,

    /// Collider query settings
    pub physics: PhysicsConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            frames: 12,
            ship_speed: 1.5,
            ship_turn_degrees: 7.5,
            sight_range: 40.0,
            physics: PhysicsConfig::default(),
        }
    }
}

impl Config for SandboxConfig {}
