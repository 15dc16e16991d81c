//! Peggle - A ball-and-peg physics game engine
//!
//! Core modules:
//! - `physics`: Rigid bodies, narrow-phase collision, integration and wall handling
//! - `sim`: Game entities (pegs, board, bucket, cannon ball) and the per-tick game engine
//! - `settings`: Data-driven engine configuration
//! - `error`: Errors for the operations that do not use boolean results

pub mod error;
pub mod physics;
pub mod settings;
pub mod sim;

pub use error::EngineError;
pub use settings::EngineConfig;

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second
    pub const FRAMERATE: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f64 = 1.0 / FRAMERATE as f64;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravitational acceleration (downwards is positive y)
    pub const GRAVITY: f64 = 200.0;

    /// Peg defaults
    pub const PEG_DEFAULT_RADIUS: f64 = 20.0;
    pub const PEG_MAXIMUM_RADIUS: f64 = 40.0;

    /// Cannon ball defaults
    pub const BALL_RADIUS: f64 = 20.0;
    pub const BALL_ELASTICITY: f64 = 0.95;
    /// Y position used until the host positions the ball explicitly
    pub const BALL_DEFAULT_Y: f64 = 100.0;
    pub const BALL_START_SPEED: f64 = 200.0;

    /// Balls available at the start of a session
    pub const TOTAL_BALLS: i32 = 10;

    /// Pegs within this distance of a detonating space-blast peg light up
    pub const SPACE_BLAST_RADIUS: f64 = 100.0;
    /// Chaos pegs launch with a speed in [0, CHAOS_MAX_SPEED)
    pub const CHAOS_MAX_SPEED: f64 = 600.0;
    /// Windy mode pushes the ball with a horizontal force in [-WIND_MAX_FORCE, WIND_MAX_FORCE]
    pub const WIND_MAX_FORCE: f64 = 60.0;
    /// A round is force-restarted once the ball has been hit more than this many times per peg
    pub const STUCK_HITS_PER_PEG: u32 = 10;

    /// Bucket geometry
    pub const BUCKET_WIDTH: f64 = 150.0;
    pub const BUCKET_HEIGHT: f64 = 150.0;
    /// Horizontal distance the bucket travels per tick
    pub const BUCKET_SPEED: f64 = 2.0;
    /// The ball counts as caught this far above the rim already
    pub const BUCKET_RIM_TOLERANCE: f64 = 10.0;
    /// Keeps the ball clear of the bucket walls
    pub const BUCKET_INNER_MARGIN: f64 = 10.0;
}
