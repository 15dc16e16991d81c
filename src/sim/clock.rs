//! Host tick driving
//!
//! The host owns real time. It hands elapsed seconds to a [`FixedStepClock`],
//! which turns them into whole fixed-size ticks.

use crate::consts::MAX_SUBSTEPS;

use super::engine::PeggleGameEngine;

/// Something advanced one fixed step at a time
pub trait Tickable {
    fn tick(&mut self);

    /// Ticks are only delivered while this is true
    fn is_running(&self) -> bool;
}

impl Tickable for PeggleGameEngine {
    fn tick(&mut self) {
        self.update();
    }

    fn is_running(&self) -> bool {
        PeggleGameEngine::is_running(self)
    }
}

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    dt: f64,
    accumulator: f64,
    max_substeps: u32,
}

impl FixedStepClock {
    /// Longest frame accepted; anything longer is treated as a stall
    pub const MAX_FRAME_TIME: f64 = 0.1;

    pub fn new(framerate: u32) -> Self {
        Self {
            dt: 1.0 / f64::from(framerate.max(1)),
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Time banked towards the next tick
    pub fn pending(&self) -> f64 {
        self.accumulator
    }

    /// Feed `elapsed` seconds of host time and run as many ticks as fit.
    /// Returns the number of ticks run.
    pub fn advance<T: Tickable + ?Sized>(&mut self, elapsed: f64, target: &mut T) -> u32 {
        if !target.is_running() {
            self.accumulator = 0.0;
            return 0;
        }

        // NaN would poison the accumulator for good
        if elapsed.is_finite() {
            self.accumulator += elapsed.clamp(0.0, Self::MAX_FRAME_TIME);
        }

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < self.max_substeps && target.is_running() {
            target.tick();
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if !target.is_running() {
            self.accumulator = 0.0;
        }
        substeps
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(crate::consts::FRAMERATE)
    }
}
