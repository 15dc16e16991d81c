//! Rigid bodies
//!
//! A body is either movable (integrated every tick under its accumulated
//! continuous forces) or immovable (pinned: zero velocity, forces ignored).

use std::f64::consts::{FRAC_PI_6, TAU};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::vector::{Position, Vector};
use crate::consts::{GRAVITY, SIM_DT};

/// Stable body identifier, independent of the body's (mutable) position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(u64);

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

impl BodyId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Circle,
    /// Equilateral triangle inscribed in the body's radius
    EquilateralTriangle,
}

/// A simulated object
#[derive(Debug)]
pub struct PhysicsBody {
    id: BodyId,
    is_movable: bool,
    pub mass: f64,
    velocity: Vector,
    /// Centre of the body
    pub position: Position,
    pub radius: f64,
    /// 1 is fully elastic, 0 fully inelastic
    pub elasticity: f64,
    pub angle_of_rotation: f64,
    pub shape: Shape,
    /// Set when a collision involving this body was detected
    pub is_hit: bool,
    /// Continuous forces; they stay applied until the body is made immovable
    forces: Vec<Vector>,
}

impl PhysicsBody {
    /// Create a circular body with unit mass and full elasticity
    pub fn new(is_movable: bool, radius: f64, position: Position) -> Self {
        Self {
            id: BodyId::next(),
            is_movable,
            mass: 1.0,
            velocity: Vector::ZERO,
            position,
            radius,
            elasticity: 1.0,
            angle_of_rotation: 0.0,
            shape: Shape::Circle,
            is_hit: false,
            forces: Vec::new(),
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f64) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn with_shape(mut self, shape: Shape, angle_of_rotation: f64) -> Self {
        self.shape = shape;
        self.angle_of_rotation = angle_of_rotation;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn is_movable(&self) -> bool {
        self.is_movable
    }

    /// Flip mobility. Pinning a body zeroes its velocity and drops its forces.
    pub fn set_movable(&mut self, is_movable: bool) {
        self.is_movable = is_movable;
        if !is_movable {
            self.velocity = Vector::ZERO;
            self.forces.clear();
        }
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    /// No-op for immovable bodies
    pub fn set_velocity(&mut self, velocity: Vector) {
        if self.is_movable {
            self.velocity = velocity;
        }
    }

    /// Continuous forces currently acting on the body
    pub fn forces(&self) -> &[Vector] {
        &self.forces
    }

    pub fn resultant_force(&self) -> Vector {
        self.forces.iter().copied().sum()
    }

    /// Add a continuous force. Ignored by immovable bodies.
    pub fn apply_force(&mut self, force: Vector) {
        if self.is_movable {
            self.forces.push(force);
        }
    }

    pub fn distance_from(&self, other: &PhysicsBody) -> f64 {
        self.position.distance_to(other.position)
    }

    /// Advance one tick at the default framerate
    pub fn update(&mut self) {
        self.step(SIM_DT);
    }

    /// Advance by `dt` seconds: position from the current velocity, then
    /// velocity from the resultant force.
    pub fn step(&mut self, dt: f64) {
        if !self.is_movable {
            return;
        }

        self.position += self.velocity * dt;

        let acceleration = self.resultant_force() * (1.0 / self.mass);
        self.velocity += acceleration * dt;
    }

    /// Launch under the default gravity
    pub fn launch(&mut self, angle: f64, speed: f64) {
        self.launch_with_gravity(angle, speed, GRAVITY);
    }

    /// Apply the body's weight as a persistent force, then add the launch
    /// velocity on top of the current one.
    ///
    /// For `angle <= 0` both components are negated, so the launch direction
    /// is mirrored through the origin. Hosts rely on this convention when
    /// converting aim gestures into angles.
    pub fn launch_with_gravity(&mut self, angle: f64, speed: f64, gravity: f64) {
        if !self.is_movable {
            return;
        }

        self.apply_force(Vector::new(0.0, gravity * self.mass));

        let direction = if angle > 0.0 {
            Vector::new(angle.cos(), angle.sin())
        } else {
            Vector::new(-angle.cos(), -angle.sin())
        };
        self.velocity += direction * speed;
    }

    /// Vertices in clockwise order. Circles have none.
    pub fn vertices(&self) -> Vec<Position> {
        match self.shape {
            Shape::Circle => Vec::new(),
            Shape::EquilateralTriangle => {
                let center = self.position;
                let r = self.radius;
                // The triangle looks the same every third of a turn
                let angle = self.angle_of_rotation % (TAU / 3.0);

                vec![
                    center + Vector::new(r * angle.sin(), -r * angle.cos()),
                    center
                        + Vector::new(-r * (FRAC_PI_6 - angle).cos(), r * (FRAC_PI_6 - angle).sin()),
                    center
                        + Vector::new(r * (FRAC_PI_6 + angle).cos(), r * (FRAC_PI_6 + angle).sin()),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 0.03;

    fn movable_at_origin() -> PhysicsBody {
        PhysicsBody::new(true, 10.0, Position::new(0.0, 0.0))
    }

    #[test]
    fn test_ids_are_unique() {
        let a = movable_at_origin();
        let b = movable_at_origin();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn test_immovable_ignores_forces_and_launch() {
        let mut body = PhysicsBody::new(false, 10.0, Position::new(5.0, 5.0))
            .with_velocity(Vector::new(3.0, 3.0));
        assert_eq!(body.velocity(), Vector::ZERO);

        body.apply_force(Vector::new(10.0, 0.0));
        body.launch(1.0, 100.0);
        for _ in 0..60 {
            body.update();
        }

        assert!(body.forces().is_empty());
        assert_eq!(body.velocity(), Vector::ZERO);
        assert_eq!(body.position, Position::new(5.0, 5.0));
    }

    #[test]
    fn test_constant_force_integration() {
        let force = 30.0;
        let mass = 2.0;
        let mut body = movable_at_origin().with_mass(mass);
        body.apply_force(Vector::new(force, 0.0));

        let seconds = 2.0;
        for _ in 0..(seconds * 60.0) as usize {
            body.update();
        }

        let expected = 0.5 * (force / mass) * seconds * seconds;
        assert!(
            (body.position.x - expected).abs() / expected < TOLERANCE,
            "x={} expected={}",
            body.position.x,
            expected
        );
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn test_launch_projectile_motion() {
        let speed = 150.0;
        let mut body = movable_at_origin();
        body.launch(1e-9, speed);

        let seconds = 1.5;
        for _ in 0..(seconds * 60.0) as usize {
            body.update();
        }

        let expected_x = speed * seconds;
        let expected_y = 0.5 * GRAVITY * seconds * seconds;
        assert!((body.position.x - expected_x).abs() / expected_x < TOLERANCE);
        assert!((body.position.y - expected_y).abs() / expected_y < TOLERANCE);
    }

    #[test]
    fn test_gravity_applied_once_and_persists() {
        let mut body = movable_at_origin().with_mass(3.0);
        body.launch(0.5, 10.0);
        assert_eq!(body.forces(), &[Vector::new(0.0, 3.0 * GRAVITY)]);

        for _ in 0..10 {
            body.update();
        }
        assert_eq!(body.forces().len(), 1);
    }

    #[test]
    fn test_non_positive_angle_mirrors_launch() {
        let mut positive = movable_at_origin();
        positive.launch(PI / 4.0, 100.0);
        let mut negative = movable_at_origin();
        negative.launch(-PI / 4.0, 100.0);

        let p = positive.velocity();
        let n = negative.velocity();
        assert!((p.x - n.x.abs()).abs() < 1e-9);
        assert!(n.x < 0.0);
        assert!((n.y - p.y).abs() < 1e-9);

        let mut zero = movable_at_origin();
        zero.launch(0.0, 100.0);
        assert!((zero.velocity().x + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_launch_superposes_existing_velocity() {
        let mut body = movable_at_origin().with_velocity(Vector::new(5.0, -5.0));
        body.launch(PI / 2.0, 10.0);
        let v = body.velocity();
        assert!((v.x - 5.0).abs() < 1e-9);
        assert!((v.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_has_no_vertices() {
        assert!(movable_at_origin().vertices().is_empty());
    }

    #[test]
    fn test_triangle_vertices_on_circumcircle() {
        let center = Position::new(50.0, 80.0);
        let body = PhysicsBody::new(false, 20.0, center)
            .with_shape(Shape::EquilateralTriangle, 0.3);
        let vertices = body.vertices();
        assert_eq!(vertices.len(), 3);

        for v in &vertices {
            assert!((v.distance_to(center) - 20.0).abs() < 1e-9);
        }
        let side = vertices[0].distance_to(vertices[1]);
        assert!((vertices[1].distance_to(vertices[2]) - side).abs() < 1e-9);
        assert!((vertices[2].distance_to(vertices[0]) - side).abs() < 1e-9);
    }

    #[test]
    fn test_triangle_rotation_is_periodic() {
        let at = |angle| {
            PhysicsBody::new(false, 20.0, Position::new(0.0, 0.0))
                .with_shape(Shape::EquilateralTriangle, angle)
                .vertices()
        };
        let base = at(0.2);
        let turned = at(0.2 + TAU / 3.0);
        for (a, b) in base.iter().zip(&turned) {
            assert!(a.distance_to(*b) < 1e-9);
        }
        // First vertex points straight up when unrotated
        let up = at(0.0);
        assert!((up[0].y + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinning_clears_motion() {
        let mut body = movable_at_origin();
        body.launch(1.0, 50.0);
        body.set_movable(false);
        assert_eq!(body.velocity(), Vector::ZERO);
        assert!(body.forces().is_empty());
    }
}
