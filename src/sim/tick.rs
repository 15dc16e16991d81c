//! Fixed timestep game tick
//!
//! One call to [`PeggleGameEngine::update`] runs, in order: chaos launches,
//! the physics step, the render callback, then the game rules that read the
//! new physical state.

use std::f64::consts::TAU;

use rand::Rng;

use super::engine::{Bodies, PeggleGameEngine};
use super::state::Powerup;
use crate::physics::{BodyId, Position, Shape};

impl PeggleGameEngine {
    /// Advance the game by one tick
    pub fn update(&mut self) {
        self.launch_chaos_pegs();

        let mut bodies = Bodies {
            board: &mut self.board,
            ball: &mut self.cannon_ball,
        };
        self.physics.update(&mut bodies);

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render();
        }

        self.handle_ball_out_of_bounds();
        self.move_bucket();
        self.check_bucket_catch();
        self.check_stuck_ball();
        self.trigger_powerups();
        self.promote_chaos_pegs();
    }

    /// Fire promoted pegs that are still pinned, then drop the ones that have
    /// fallen off the board
    fn launch_chaos_pegs(&mut self) {
        if !self.is_chaos_mode {
            return;
        }

        for id in self.chaos_pegs.clone() {
            let pinned_and_clear = {
                let bodies = Bodies {
                    board: &mut self.board,
                    ball: &mut self.cannon_ball,
                };
                bodies.board.peg(id).is_some_and(|peg| {
                    !peg.body().is_movable() && !self.physics.overlaps_registered(peg.body(), &bodies)
                })
            };
            // Wait for whatever it touches to move away
            if !pinned_and_clear {
                continue;
            }

            self.physics.remove_physics_body(id);
            if let Some(peg) = self.board.peg_mut(id) {
                peg.body_mut().set_movable(true);
            }
            if !self.register(id) {
                log::warn!("Chaos peg {:?} could not rejoin the simulation", id);
                continue;
            }

            let angle = self.rng.random_range(0.0..TAU);
            let max_speed = self.config.chaos_max_speed;
            let speed = if max_speed > 0.0 {
                self.rng.random_range(0.0..max_speed)
            } else {
                0.0
            };
            let gravity = self.config.gravity;
            if let Some(peg) = self.board.peg_mut(id) {
                peg.body_mut().launch_with_gravity(angle, speed, gravity);
            }
            log::debug!("Chaos peg {:?} launched at {:.2} rad, speed {:.1}", id, angle, speed);
        }

        let fallen: Vec<BodyId> = self
            .chaos_pegs
            .iter()
            .copied()
            .filter(|&id| {
                self.board
                    .peg(id)
                    .is_none_or(|peg| self.physics.is_body_out_of_lower_bound(peg.body()))
            })
            .collect();
        for &id in &fallen {
            self.physics.remove_physics_body(id);
        }
        self.chaos_pegs.retain(|id| !fallen.contains(id));
    }

    fn handle_ball_out_of_bounds(&mut self) {
        let out = self.is_ball_out_of_bounds();
        let spooky_armed = self.is_spooky_ball_triggered;

        if out {
            if spooky_armed {
                let x = self.cannon_ball.location().x;
                self.cannon_ball.body_mut().position =
                    Position::new(x, -self.config.peg_default_radius);
                self.is_spooky_ball_triggered = false;
                log::info!("Spooky ball: respawned at the ceiling");
            } else if self.physics.remove_physics_body(self.cannon_ball.id()) {
                log::debug!("Ball left the board");
            }
        }

        let ball_lost = out && !spooky_armed;
        let round_over = if self.is_chaos_mode {
            ball_lost && self.chaos_pegs.is_empty() && !self.is_restarted
        } else {
            ball_lost && !self.is_restarted
        };
        if round_over {
            self.end_round("ball out of bounds");
        }
    }

    fn move_bucket(&mut self) {
        let bounds = self.physics.bounds();
        let moving_left = self.bucket.is_moving_left();
        if (moving_left && self.bucket.hits_left_boundary(bounds.left))
            || (!moving_left && self.bucket.hits_right_boundary(bounds.right))
        {
            self.bucket.toggle_direction();
        }
        self.bucket.move_step();
    }

    /// A ball caught by the bucket is refunded, once per round
    fn check_bucket_catch(&mut self) {
        let in_play = self.physics.contains(self.cannon_ball.id());
        if in_play && self.is_ball_inside_bucket() && !self.has_ball_entered {
            self.number_of_balls_left += 1;
            self.has_ball_entered = true;
            log::info!("Ball caught by the bucket: {} balls left", self.number_of_balls_left);
        }
    }

    fn check_stuck_ball(&mut self) {
        let body = self.cannon_ball.body_mut();
        if body.is_hit {
            body.is_hit = false;
            self.cannon_ball.hit_counter += 1;
        }

        let limit = self.board.len() as u64 * u64::from(self.config.stuck_hits_per_peg);
        if u64::from(self.cannon_ball.hit_counter) > limit && !self.is_restarted {
            self.end_round("ball stuck");
        }
    }

    fn trigger_powerups(&mut self) {
        let activated: Vec<(Powerup, Position)> = self
            .board
            .pegs_mut()
            .filter_map(|peg| {
                peg.is_powerup_activated()
                    .then(|| (peg.powerup, peg.location()))
            })
            .collect();

        for (powerup, center) in activated {
            match powerup {
                Powerup::SpaceBlast => {
                    let radius = self.config.space_blast_radius;
                    let mut lit = 0;
                    for peg in self.board.pegs_mut() {
                        if peg.location().distance_to(center) <= radius {
                            peg.set_hit(true);
                            lit += 1;
                        }
                    }
                    log::info!("Space blast at ({:.0}, {:.0}) lit {} pegs", center.x, center.y, lit);
                }
                Powerup::SpookyBall => {
                    self.is_spooky_ball_triggered = true;
                    log::info!("Spooky ball armed");
                }
                Powerup::None => {}
            }
        }
    }

    /// In chaos mode every pinned circle peg hit this tick becomes a projectile
    /// on the next one
    fn promote_chaos_pegs(&mut self) {
        if !self.is_chaos_mode {
            return;
        }

        let promoted: Vec<BodyId> = self
            .board
            .pegs()
            .filter(|peg| {
                peg.shape() == Shape::Circle
                    && peg.is_hit()
                    && !peg.body().is_movable()
                    && self.physics.contains(peg.id())
                    && !self.chaos_pegs.contains(&peg.id())
            })
            .map(|peg| peg.id())
            .collect();

        for id in promoted {
            log::debug!("Peg {:?} promoted to chaos projectile", id);
            self.chaos_pegs.push(id);
        }
    }
}
