use thiserror::Error;

use crate::sim::RoundPhase;

/// Errors returned by engine operations that are not plain accept/reject checks
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannon ball has no y position yet; call set_ball_y_position first")]
    BallNotPositioned,

    #[error("cannot launch while the round is {phase:?}")]
    LaunchBlocked { phase: RoundPhase },

    #[error("invalid configuration or layout: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
