//! Game engine: owns the physics engine, the board, the bucket and the
//! cannon ball, and exposes round control and queries to the host.
//!
//! The per-tick sequence lives in `tick.rs`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::board::GameBoard;
use super::state::{Bucket, CannonBall, Peg, PegColor, Powerup, RoundPhase};
use crate::error::{EngineError, Result};
use crate::physics::{BodyId, BodyStore, Bounds, PhysicsBody, PhysicsEngine, Position, Vector};
use crate::settings::EngineConfig;

/// Called once per tick, right after the physics step
pub trait Renderer {
    fn render(&mut self);
}

impl<F: FnMut()> Renderer for F {
    fn render(&mut self) {
        self()
    }
}

/// Lets the physics engine reach the bodies owned by pegs and the ball
pub(super) struct Bodies<'a> {
    pub board: &'a mut GameBoard,
    pub ball: &'a mut CannonBall,
}

impl BodyStore for Bodies<'_> {
    fn body(&self, id: BodyId) -> Option<&PhysicsBody> {
        if id == self.ball.id() {
            Some(self.ball.body())
        } else {
            self.board.peg(id).map(Peg::body)
        }
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut PhysicsBody> {
        if id == self.ball.id() {
            Some(self.ball.body_mut())
        } else {
            self.board.peg_mut(id).map(Peg::body_mut)
        }
    }
}

/// One game session on one board
pub struct PeggleGameEngine {
    pub(super) config: EngineConfig,
    pub(super) physics: PhysicsEngine,
    pub(super) board: GameBoard,
    pub(super) cannon_ball: CannonBall,
    pub(super) bucket: Bucket,
    pub(super) renderer: Option<Box<dyn Renderer>>,
    pub(super) rng: Pcg32,

    cannon_x: f64,
    /// Last y set by the host; `None` until the ball is positioned
    ball_y: Option<f64>,
    is_running: bool,

    pub(super) number_of_balls_left: i32,
    pub(super) score: u64,
    pub(super) has_ball_entered: bool,

    pub(super) is_chaos_mode: bool,
    pub(super) is_windy_mode: bool,
    pub(super) is_spooky_ball_triggered: bool,
    pub(super) is_restarted: bool,
    pub(super) should_delete_all_pegs: bool,
    /// Pegs promoted to projectiles, in promotion order
    pub(super) chaos_pegs: Vec<BodyId>,
}

impl std::fmt::Debug for PeggleGameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeggleGameEngine")
            .field("board", &self.board.name)
            .field("pegs", &self.board.len())
            .field("phase", &self.phase())
            .field("balls_left", &self.number_of_balls_left)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

impl PeggleGameEngine {
    pub fn new(bounds: Bounds, board: GameBoard) -> Self {
        Self::with_config(bounds, board, EngineConfig::default())
    }

    /// Build an engine and register the ball and every peg with physics.
    /// Pegs that physics refuses (overlapping the ball at the cannon, say)
    /// are taken off the board, so every peg left on it can be hit.
    pub fn with_config(bounds: Bounds, board: GameBoard, config: EngineConfig) -> Self {
        let cannon_x = bounds.center_x();
        let cannon_ball = CannonBall::new(
            Position::new(cannon_x, config.default_ball_y),
            config.ball_radius,
            config.ball_elasticity,
        );
        let bucket = Bucket::new(
            &bounds,
            config.bucket_width,
            config.bucket_height,
            config.bucket_speed,
        );

        let mut engine = Self {
            physics: PhysicsEngine::with_framerate(bounds, config.framerate),
            board,
            cannon_ball,
            bucket,
            renderer: None,
            rng: Pcg32::seed_from_u64(config.seed),
            cannon_x,
            ball_y: None,
            is_running: false,
            number_of_balls_left: config.total_balls,
            score: 0,
            has_ball_entered: false,
            is_chaos_mode: false,
            is_windy_mode: false,
            is_spooky_ball_triggered: false,
            is_restarted: false,
            should_delete_all_pegs: false,
            chaos_pegs: Vec::new(),
            config,
        };

        engine.board.set_pick_radius(engine.config.peg_default_radius);

        let ball = engine.cannon_ball.id();
        engine.register(ball);
        for id in engine.board.ids() {
            if !engine.register(id) {
                engine.board.remove_peg(id);
                log::warn!("Dropped peg {:?}: it overlaps another body", id);
            }
        }

        log::info!(
            "Game engine ready: board '{}' with {} pegs, {} balls",
            engine.board.name,
            engine.board.len(),
            engine.number_of_balls_left
        );
        engine
    }

    /// Engine on the stock 3 x 4 grid
    pub fn with_default_board(bounds: Bounds) -> Self {
        Self::new(bounds, GameBoard::default_grid())
    }

    pub(super) fn register(&mut self, id: BodyId) -> bool {
        let bodies = Bodies {
            board: &mut self.board,
            ball: &mut self.cannon_ball,
        };
        self.physics.add_physics_body(id, &bodies)
    }

    pub(super) fn end_round(&mut self, reason: &str) {
        self.should_delete_all_pegs = true;
        self.is_restarted = true;
        log::info!("Round over: {}", reason);
    }

    // === Host configuration ===

    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderer = Some(Box::new(renderer));
    }

    pub fn set_chaos_mode(&mut self, enabled: bool) {
        self.is_chaos_mode = enabled;
    }

    pub fn set_windy_mode(&mut self, enabled: bool) {
        self.is_windy_mode = enabled;
    }

    /// Assign `powerup` to every green peg
    pub fn set_powerup(&mut self, powerup: Powerup) {
        for peg in self.board.pegs_mut().filter(|p| p.color == PegColor::Green) {
            peg.powerup = powerup;
        }
    }

    /// Restart the random stream used for chaos launches and wind
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Add a peg during play. Rejected if it overlaps a peg or any body in
    /// the simulation.
    pub fn add_peg(&mut self, peg: Peg) -> bool {
        let id = peg.id();
        if !self.board.add_peg(peg) {
            return false;
        }
        if !self.register(id) {
            self.board.remove_peg(id);
            return false;
        }
        true
    }

    // === Round control ===

    /// Put the ball at height `y` above the cannon. Restarted balls reuse it.
    pub fn set_ball_y_position(&mut self, y: f64) {
        self.cannon_ball.set_y(y);
        self.ball_y = Some(y);
    }

    /// Fire the ball. Only allowed while aiming, after the ball has been
    /// positioned.
    pub fn launch_cannon_ball(&mut self, angle: f64, speed: f64) -> Result<()> {
        if self.ball_y.is_none() {
            return Err(EngineError::BallNotPositioned);
        }
        let phase = self.phase();
        if phase != RoundPhase::Aiming {
            return Err(EngineError::LaunchBlocked { phase });
        }

        self.is_restarted = false;
        self.should_delete_all_pegs = false;

        let gravity = self.config.gravity;
        self.cannon_ball
            .body_mut()
            .launch_with_gravity(angle, speed, gravity);

        if self.is_windy_mode {
            let max = self.config.wind_max_force;
            let wind = if max > 0.0 {
                self.rng.random_range(-max..=max)
            } else {
                0.0
            };
            self.cannon_ball.body_mut().apply_force(Vector::new(wind, 0.0));
            log::debug!("Wind force {:.1}", wind);
        }

        self.is_running = true;
        log::info!(
            "Launched ball {} at angle {:.3} speed {:.1}",
            self.number_of_balls_left,
            angle,
            speed
        );
        Ok(())
    }

    /// Launch at the configured starting speed
    pub fn launch_at_default_speed(&mut self, angle: f64) -> Result<()> {
        self.launch_cannon_ball(angle, self.config.initial_ball_speed)
    }

    /// Replace the ball with a fresh one at the cannon and use up a ball
    pub fn restart_another_round(&mut self) {
        self.is_running = false;
        self.physics.remove_physics_body(self.cannon_ball.id());

        let y = self.ball_y.unwrap_or(self.config.default_ball_y);
        self.cannon_ball = CannonBall::new(
            Position::new(self.cannon_x, y),
            self.config.ball_radius,
            self.config.ball_elasticity,
        );
        let ball = self.cannon_ball.id();
        if !self.register(ball) {
            log::warn!("Cannon ball overlaps a body at the cannon position");
        }

        self.number_of_balls_left -= 1;
        self.has_ball_entered = false;
        self.is_restarted = false;
        self.should_delete_all_pegs = false;
        log::info!(
            "New round: {} balls left, {} orange pegs left",
            self.number_of_balls_left,
            self.number_of_orange_pegs_left()
        );
    }

    // === Peg removal ===

    /// Remove the peg found at `point` from the board and the simulation
    pub fn remove_peg_at(&mut self, point: Position) -> bool {
        let Some(id) = self.board.find_peg_at(point) else {
            return false;
        };
        self.remove_peg(id)
    }

    fn remove_peg(&mut self, id: BodyId) -> bool {
        self.physics.remove_physics_body(id);
        self.chaos_pegs.retain(|&chaos| chaos != id);
        self.board.remove_peg(id)
    }

    /// Clear every hit peg once the round is over. Returns how many were
    /// removed.
    pub fn remove_hit_pegs(&mut self) -> usize {
        let hit = self.pegs_hit();
        let removed = hit.into_iter().filter(|&id| self.remove_peg(id)).count();
        self.should_delete_all_pegs = false;
        log::debug!("Removed {} hit pegs", removed);
        removed
    }

    // === Queries ===

    pub fn phase(&self) -> RoundPhase {
        if self.has_won() {
            RoundPhase::Won
        } else if self.has_lost() {
            RoundPhase::Lost
        } else if self.is_restarted {
            RoundPhase::Resolving
        } else if self.is_running {
            RoundPhase::InFlight
        } else {
            RoundPhase::Aiming
        }
    }

    pub fn has_won(&self) -> bool {
        self.number_of_orange_pegs_left() == 0
    }

    pub fn has_lost(&self) -> bool {
        self.number_of_orange_pegs_left() > 0 && self.number_of_balls_left <= 0
    }

    /// Adds `hit_counter * peg count` to the score on every call and
    /// returns the new total.
    pub fn get_current_score(&mut self) -> u64 {
        let pegs = self.board.len() as u64;
        self.score += u64::from(self.cannon_ball.hit_counter) * pegs;
        self.score
    }

    /// Score accumulated so far, without adding to it
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Ids of every peg currently hit
    pub fn pegs_hit(&self) -> Vec<BodyId> {
        self.board
            .pegs()
            .filter(|p| p.is_hit())
            .map(Peg::id)
            .collect()
    }

    /// Ids of pegs hit since the previous call
    pub fn newly_hit_pegs(&mut self) -> Vec<BodyId> {
        let mut hits = Vec::new();
        for peg in self.board.pegs_mut() {
            if peg.is_hit() && !peg.has_been_hit() {
                peg.mark_reported();
                hits.push(peg.id());
            }
        }
        hits
    }

    pub fn number_of_orange_pegs_left(&self) -> usize {
        self.board.number_of_pegs_of_color(PegColor::Orange)
    }

    pub fn number_of_balls_left(&self) -> i32 {
        self.number_of_balls_left
    }

    pub fn ball_location(&self) -> Position {
        self.cannon_ball.location()
    }

    pub fn bucket_bottom_center(&self) -> Position {
        self.bucket.bottom_center
    }

    pub fn is_ball_out_of_bounds(&self) -> bool {
        self.physics
            .is_body_out_of_lower_bound(self.cannon_ball.body())
    }

    pub fn is_ball_inside_bucket(&self) -> bool {
        self.bucket
            .is_in_bucket(self.cannon_ball.location(), self.cannon_ball.radius())
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_restarted(&self) -> bool {
        self.is_restarted
    }

    pub fn should_delete_all_pegs(&self) -> bool {
        self.should_delete_all_pegs
    }

    pub fn is_spooky_ball_triggered(&self) -> bool {
        self.is_spooky_ball_triggered
    }

    pub fn is_chaos_mode(&self) -> bool {
        self.is_chaos_mode
    }

    pub fn is_windy_mode(&self) -> bool {
        self.is_windy_mode
    }

    pub fn chaos_pegs(&self) -> &[BodyId] {
        &self.chaos_pegs
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn cannon_ball(&self) -> &CannonBall {
        &self.cannon_ball
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::f64::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn bounds() -> Bounds {
        Bounds::new(0.0, 800.0, 0.0, 1000.0)
    }

    fn board_with(pegs: Vec<Peg>) -> GameBoard {
        let mut board = GameBoard::new("test");
        for peg in pegs {
            assert!(board.add_peg(peg));
        }
        board
    }

    #[test]
    fn test_construction_registers_everything() {
        let engine = PeggleGameEngine::with_default_board(bounds());
        assert_eq!(engine.physics().immovable_count(), 12);
        assert_eq!(engine.physics().movable_count(), 1);
        assert_eq!(engine.ball_location(), Position::new(400.0, 100.0));
        assert_eq!(engine.number_of_balls_left(), 10);
        assert_eq!(engine.phase(), RoundPhase::Aiming);
    }

    #[test]
    fn test_construction_drops_pegs_physics_refuses() {
        // Accepted by the board, but sits on the ball at the cannon
        let at_cannon = Peg::circle(PegColor::Orange, Position::new(400.0, 110.0));
        let at_cannon_id = at_cannon.id();
        let mut engine = PeggleGameEngine::new(
            bounds(),
            board_with(vec![
                at_cannon,
                Peg::circle(PegColor::Blue, Position::new(360.0, 500.0)),
                Peg::circle(PegColor::Orange, Position::new(420.0, 500.0)),
            ]),
        );

        assert!(engine.board().peg(at_cannon_id).is_none());
        assert_eq!(engine.board().len(), 2);
        assert!(engine.physics().contains(engine.cannon_ball().id()));
        for id in engine.board().ids() {
            assert!(engine.physics().contains(id));
        }

        // The remaining orange peg is reachable, so the board can be won
        assert!(engine.remove_peg_at(Position::new(420.0, 500.0)));
        assert!(engine.has_won());
    }

    #[test]
    fn test_remove_peg_at_uses_configured_radius() {
        let config = EngineConfig {
            peg_default_radius: 5.0,
            ..EngineConfig::default()
        };
        let pegs = || {
            board_with(vec![
                Peg::circle(PegColor::Orange, Position::new(200.0, 500.0)),
                Peg::circle(PegColor::Blue, Position::new(600.0, 500.0)),
            ])
        };

        let mut engine = PeggleGameEngine::with_config(bounds(), pegs(), config);
        assert_eq!(engine.board().pick_radius(), 5.0);
        assert!(!engine.remove_peg_at(Position::new(210.0, 500.0)));
        assert!(engine.remove_peg_at(Position::new(203.0, 500.0)));

        let mut engine = PeggleGameEngine::new(bounds(), pegs());
        assert!(engine.remove_peg_at(Position::new(610.0, 500.0)));
    }

    #[test]
    fn test_launch_requires_positioned_ball() {
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        assert!(matches!(
            engine.launch_cannon_ball(FRAC_PI_2, 200.0),
            Err(EngineError::BallNotPositioned)
        ));

        engine.set_ball_y_position(120.0);
        engine.launch_cannon_ball(FRAC_PI_2, 200.0).expect("aiming");
        assert!(engine.is_running());
        assert!(matches!(
            engine.launch_cannon_ball(FRAC_PI_2, 200.0),
            Err(EngineError::LaunchBlocked {
                phase: RoundPhase::InFlight
            })
        ));
    }

    #[test]
    fn test_restart_positions_fresh_ball() {
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        engine.set_ball_y_position(150.0);
        engine.launch_at_default_speed(1.0).expect("launch");
        for _ in 0..20 {
            engine.update();
        }
        let old_ball = engine.cannon_ball().id();

        engine.restart_another_round();

        assert_ne!(engine.cannon_ball().id(), old_ball);
        assert!(!engine.physics().contains(old_ball));
        assert!(engine.physics().contains(engine.cannon_ball().id()));
        assert_eq!(engine.ball_location(), Position::new(400.0, 150.0));
        assert_eq!(engine.cannon_ball().body().velocity(), Vector::ZERO);
        assert_eq!(engine.number_of_balls_left(), 9);
        assert!(!engine.is_running());
        assert_eq!(engine.phase(), RoundPhase::Aiming);
    }

    #[test]
    fn test_won_and_lost_are_exclusive() {
        let orange = Peg::circle(PegColor::Orange, Position::new(200.0, 500.0));
        let orange_id = orange.id();
        let mut engine = PeggleGameEngine::new(bounds(), board_with(vec![orange]));
        engine.set_ball_y_position(100.0);

        for _ in 0..9 {
            engine.restart_another_round();
            assert!(!engine.has_lost() && !engine.has_won());
        }
        engine.restart_another_round();
        assert_eq!(engine.number_of_balls_left(), 0);
        assert!(engine.has_lost());
        assert!(!engine.has_won());
        assert_eq!(engine.phase(), RoundPhase::Lost);

        assert!(engine.remove_peg_at(Position::new(200.0, 500.0)));
        assert!(engine.board().peg(orange_id).is_none());
        assert!(engine.has_won());
        assert!(!engine.has_lost());
        assert_eq!(engine.phase(), RoundPhase::Won);
    }

    #[test]
    fn test_score_accumulates_per_query() {
        let mut engine = PeggleGameEngine::new(
            bounds(),
            board_with(vec![
                Peg::circle(PegColor::Orange, Position::new(200.0, 500.0)),
                Peg::circle(PegColor::Blue, Position::new(600.0, 500.0)),
            ]),
        );
        engine.cannon_ball.hit_counter = 3;

        assert_eq!(engine.get_current_score(), 6);
        assert_eq!(engine.get_current_score(), 12);
        assert_eq!(engine.score(), 12);
    }

    #[test]
    fn test_set_powerup_only_touches_green() {
        let mut engine = PeggleGameEngine::new(
            bounds(),
            board_with(vec![
                Peg::circle(PegColor::Green, Position::new(200.0, 500.0)),
                Peg::circle(PegColor::Orange, Position::new(600.0, 500.0)),
            ]),
        );
        engine.set_powerup(Powerup::SpookyBall);

        for peg in engine.board().pegs() {
            let expected = if peg.color == PegColor::Green {
                Powerup::SpookyBall
            } else {
                Powerup::None
            };
            assert_eq!(peg.powerup, expected);
        }
    }

    #[test]
    fn test_add_and_remove_pegs() {
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        // On top of the ball at the cannon
        assert!(!engine.add_peg(Peg::circle(PegColor::Blue, Position::new(400.0, 130.0))));
        // On top of an existing peg
        assert!(!engine.add_peg(Peg::circle(PegColor::Blue, Position::new(210.0, 200.0))));
        assert!(engine.add_peg(Peg::circle(PegColor::Green, Position::new(300.0, 300.0))));
        assert_eq!(engine.board().len(), 13);
        assert_eq!(engine.physics().immovable_count(), 13);

        assert!(engine.remove_peg_at(Position::new(300.0, 300.0)));
        assert!(!engine.remove_peg_at(Position::new(300.0, 300.0)));
        assert_eq!(engine.physics().immovable_count(), 12);
    }

    #[test]
    fn test_hit_queries_and_removal() {
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        let ids = engine.board().ids();
        for &id in &ids[..2] {
            if let Some(peg) = engine.board.peg_mut(id) {
                peg.set_hit(true);
            }
        }

        assert_eq!(engine.pegs_hit(), ids[..2].to_vec());
        assert_eq!(engine.newly_hit_pegs(), ids[..2].to_vec());
        assert!(engine.newly_hit_pegs().is_empty());

        engine.should_delete_all_pegs = true;
        assert_eq!(engine.remove_hit_pegs(), 2);
        assert!(!engine.should_delete_all_pegs());
        assert_eq!(engine.board().len(), 10);
        assert_eq!(engine.physics().immovable_count(), 10);
    }

    #[test]
    fn test_renderer_called_each_tick() {
        let frames = Rc::new(Cell::new(0));
        let counter = Rc::clone(&frames);
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        engine.set_renderer(move || counter.set(counter.get() + 1));

        for _ in 0..5 {
            engine.update();
        }
        assert_eq!(frames.get(), 5);
    }

    #[test]
    fn test_windy_launch_adds_horizontal_force() {
        let mut engine = PeggleGameEngine::with_default_board(bounds());
        engine.set_windy_mode(true);
        engine.reseed(3);
        engine.set_ball_y_position(100.0);
        engine.launch_cannon_ball(FRAC_PI_2, 200.0).expect("launch");

        let forces = engine.cannon_ball().body().forces();
        assert_eq!(forces.len(), 2);
        assert_eq!(forces[0], Vector::new(0.0, 200.0));
        assert_eq!(forces[1].y, 0.0);
        assert!(forces[1].x.abs() <= engine.config().wind_max_force);
    }
}
