//! Engine configuration
//!
//! Every tunable the game engine reads lives here. Missing fields in a JSON
//! file fall back to the defaults in [`crate::consts`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Tunables for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Simulation ===
    /// Ticks per simulated second
    pub framerate: u32,
    /// Downward acceleration applied to launched bodies
    pub gravity: f64,
    /// Seed for chaos launches and wind
    pub seed: u64,

    // === Cannon ball ===
    pub total_balls: i32,
    pub initial_ball_speed: f64,
    pub ball_radius: f64,
    pub ball_elasticity: f64,
    pub default_ball_y: f64,

    // === Pegs & powerups ===
    pub peg_default_radius: f64,
    pub space_blast_radius: f64,
    pub chaos_max_speed: f64,
    pub wind_max_force: f64,
    /// Ball hits allowed per peg on the board before the round is forced to end
    pub stuck_hits_per_peg: u32,

    // === Bucket ===
    pub bucket_width: f64,
    pub bucket_height: f64,
    /// Distance moved per tick
    pub bucket_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            framerate: FRAMERATE,
            gravity: GRAVITY,
            seed: 0,

            total_balls: TOTAL_BALLS,
            initial_ball_speed: BALL_START_SPEED,
            ball_radius: BALL_RADIUS,
            ball_elasticity: BALL_ELASTICITY,
            default_ball_y: BALL_DEFAULT_Y,

            peg_default_radius: PEG_DEFAULT_RADIUS,
            space_blast_radius: SPACE_BLAST_RADIUS,
            chaos_max_speed: CHAOS_MAX_SPEED,
            wind_max_force: WIND_MAX_FORCE,
            stuck_hits_per_peg: STUCK_HITS_PER_PEG,

            bucket_width: BUCKET_WIDTH,
            bucket_height: BUCKET_HEIGHT,
            bucket_speed: BUCKET_SPEED,
        }
    }
}

impl EngineConfig {
    /// Default configuration with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Seconds per tick
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.framerate.max(1))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Engine config saved to {}", path.display());
        Ok(())
    }
}
