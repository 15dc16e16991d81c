//! Game entities
//!
//! Pegs and the cannon ball own their physics bodies. The physics engine only
//! knows them by [`BodyId`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::physics::{BodyId, Bounds, PhysicsBody, Position, Shape, is_collision};

/// Peg colour; orange pegs must all be cleared to win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PegColor {
    Blue,
    Orange,
    /// Carries the currently selected powerup
    Green,
    Red,
}

/// Effect fired when a green peg is first hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Powerup {
    #[default]
    None,
    /// Lights up every peg within the blast radius
    SpaceBlast,
    /// Respawns the ball at the ceiling the next time it falls out
    SpookyBall,
}

/// Round state as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Ball waiting at the cannon; launching is allowed
    Aiming,
    /// Ball in play
    InFlight,
    /// Round over; the host clears hit pegs then restarts
    Resolving,
    Won,
    Lost,
}

/// A peg on the board
#[derive(Debug)]
pub struct Peg {
    pub color: PegColor,
    pub powerup: Powerup,
    body: PhysicsBody,
    /// Set once the hit has been reported to the host
    has_been_hit: bool,
    has_powerup_been_activated: bool,
}

impl Peg {
    /// Immovable peg of the default radius
    pub fn new(color: PegColor, location: Position, shape: Shape) -> Self {
        Self {
            color,
            powerup: Powerup::None,
            body: PhysicsBody::new(false, PEG_DEFAULT_RADIUS, location).with_shape(shape, 0.0),
            has_been_hit: false,
            has_powerup_been_activated: false,
        }
    }

    pub fn circle(color: PegColor, location: Position) -> Self {
        Self::new(color, location, Shape::Circle)
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.body.radius = radius;
        self
    }

    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.body.angle_of_rotation = angle;
        self
    }

    pub fn with_powerup(mut self, powerup: Powerup) -> Self {
        self.powerup = powerup;
        self
    }

    pub fn id(&self) -> BodyId {
        self.body.id()
    }

    pub fn location(&self) -> Position {
        self.body.position
    }

    pub fn set_location(&mut self, location: Position) {
        self.body.position = location;
    }

    pub fn radius(&self) -> f64 {
        self.body.radius
    }

    pub fn shape(&self) -> Shape {
        self.body.shape
    }

    pub fn angle_of_rotation(&self) -> f64 {
        self.body.angle_of_rotation
    }

    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.body
    }

    pub fn is_hit(&self) -> bool {
        self.body.is_hit
    }

    pub fn set_hit(&mut self, is_hit: bool) {
        self.body.is_hit = is_hit;
    }

    pub fn distance_from(&self, other: &Peg) -> f64 {
        self.location().distance_to(other.location())
    }

    /// Same test physics registration uses: shape aware, and touching pegs
    /// count as overlapping
    pub fn is_overlapping(&self, other: &Peg) -> bool {
        is_collision(self.body(), other.body())
    }

    /// True exactly once: the first time this peg is green and hit
    pub fn is_powerup_activated(&mut self) -> bool {
        let activated =
            self.color == PegColor::Green && self.is_hit() && !self.has_powerup_been_activated;
        if activated {
            self.has_powerup_been_activated = true;
        }
        activated
    }

    /// Whether the hit was already reported via `mark_reported`
    pub fn has_been_hit(&self) -> bool {
        self.has_been_hit
    }

    pub(crate) fn mark_reported(&mut self) {
        self.has_been_hit = true;
    }
}

/// The projectile
#[derive(Debug)]
pub struct CannonBall {
    body: PhysicsBody,
    /// Ticks in which a collision involving the ball was detected
    pub hit_counter: u32,
}

impl CannonBall {
    pub fn new(location: Position, radius: f64, elasticity: f64) -> Self {
        Self {
            body: PhysicsBody::new(true, radius, location).with_elasticity(elasticity),
            hit_counter: 0,
        }
    }

    pub fn id(&self) -> BodyId {
        self.body.id()
    }

    pub fn location(&self) -> Position {
        self.body.position
    }

    pub fn radius(&self) -> f64 {
        self.body.radius
    }

    pub fn set_y(&mut self, y: f64) {
        self.body.position.y = y;
    }

    pub fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.body
    }
}

impl Default for CannonBall {
    fn default() -> Self {
        Self::new(Position::new(0.0, BALL_DEFAULT_Y), BALL_RADIUS, BALL_ELASTICITY)
    }
}

/// Catcher sliding along the floor. Not a physics body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// y of the rim
    pub upper_boundary: f64,
    pub width: f64,
    pub bottom_center: Position,
    /// Signed x distance per tick
    step: f64,
}

impl Bucket {
    /// Bucket resting on the floor of `bounds`, centred horizontally
    pub fn new(bounds: &Bounds, width: f64, height: f64, speed: f64) -> Self {
        Self {
            upper_boundary: bounds.lower - height,
            width,
            bottom_center: Position::new(bounds.center_x(), bounds.lower),
            step: speed,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_moving_left(&self) -> bool {
        self.step < 0.0
    }

    /// Ball bottom at or below the rim (with a small tolerance above it) and
    /// the ball clear of both walls
    pub fn is_in_bucket(&self, ball_location: Position, ball_radius: f64) -> bool {
        let within_height =
            ball_location.y + ball_radius >= self.upper_boundary - BUCKET_RIM_TOLERANCE;
        let within_width = (ball_location.x - self.bottom_center.x).abs()
            <= self.width / 2.0 - ball_radius - BUCKET_INNER_MARGIN;
        within_height && within_width
    }

    pub fn move_step(&mut self) {
        self.bottom_center.x += self.step;
    }

    pub fn toggle_direction(&mut self) {
        self.step = -self.step;
    }

    pub fn hits_left_boundary(&self, left: f64) -> bool {
        self.bottom_center.x - self.width / 2.0 <= left
    }

    pub fn hits_right_boundary(&self, right: f64) -> bool {
        self.bottom_center.x + self.width / 2.0 >= right
    }
}
