//! Peggle headless runner
//!
//! Plays a full session on the default board with a scripted aim, driving the
//! engine through the fixed-step clock the way a windowed host would.
//!
//! Usage: `peggle [config.json]`

use std::f64::consts::PI;

use peggle::consts::*;
use peggle::physics::Bounds;
use peggle::sim::{FixedStepClock, GameBoard, PeggleGameEngine, RoundPhase};
use peggle::{EngineConfig, EngineError};

/// Host frame length (a 60 Hz display)
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Give up on a round that has not resolved after this many frames
const MAX_FRAMES_PER_ROUND: u32 = 60 * 60;

fn load_config() -> Result<EngineConfig, EngineError> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Sweep the aim across the board from one round to the next
fn aim_for_round(round: u32) -> f64 {
    let step = PI / 12.0;
    let angle = PI / 3.0 + step * f64::from(round % 5);
    // Alternate sides using the mirrored launch for non-positive angles
    if round % 2 == 0 { angle } else { -angle }
}

fn play_round(engine: &mut PeggleGameEngine, clock: &mut FixedStepClock, round: u32) -> Result<(), EngineError> {
    engine.launch_at_default_speed(aim_for_round(round))?;

    let mut frames = 0;
    while engine.phase() == RoundPhase::InFlight && frames < MAX_FRAMES_PER_ROUND {
        clock.advance(FRAME_TIME, engine);
        for id in engine.newly_hit_pegs() {
            log::debug!("Peg {:?} hit", id);
        }
        frames += 1;
    }

    if frames >= MAX_FRAMES_PER_ROUND {
        log::warn!("Round {} did not resolve within {} frames", round, frames);
    }

    let score = engine.get_current_score();
    let cleared = engine.remove_hit_pegs();
    log::info!("Round {}: cleared {} pegs, score {}", round, cleared, score);
    Ok(())
}

fn run() -> Result<(), EngineError> {
    let config = load_config()?;
    let bounds = Bounds::new(0.0, 800.0, 0.0, 1000.0);
    let mut engine = PeggleGameEngine::with_config(bounds, GameBoard::default_grid(), config);
    engine.set_ball_y_position(BALL_DEFAULT_Y);

    let mut clock = FixedStepClock::new(engine.config().framerate);
    let mut round = 0;

    loop {
        match engine.phase() {
            RoundPhase::Won => {
                log::info!("Won with {} balls to spare", engine.number_of_balls_left());
                break;
            }
            RoundPhase::Lost => {
                log::info!("Lost with {} orange pegs left", engine.number_of_orange_pegs_left());
                break;
            }
            RoundPhase::Aiming => {
                play_round(&mut engine, &mut clock, round)?;
                engine.restart_another_round();
                round += 1;
            }
            RoundPhase::InFlight | RoundPhase::Resolving => {
                engine.restart_another_round();
            }
        }
    }

    println!("Final score: {}", engine.score());
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Peggle (headless) starting...");

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a web host; there is no standalone entry point
}
