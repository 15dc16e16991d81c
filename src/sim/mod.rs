//! Game simulation
//!
//! All gameplay logic lives here. Like the physics layer it is deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies

pub mod board;
pub mod clock;
pub mod engine;
pub mod layout;
pub mod state;
mod tick;

pub use board::GameBoard;
pub use clock::{FixedStepClock, Tickable};
pub use engine::{PeggleGameEngine, Renderer};
pub use layout::{BoardLayout, PegLayout};
pub use state::{Bucket, CannonBall, Peg, PegColor, Powerup, RoundPhase};
