//! 2D value types
//!
//! `Vector` is used for velocities and forces, `Position` for locations.
//! Both convert to `glam::DVec2` for the heavier math.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A velocity or force
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn dot(self, other: Vector) -> f64 {
        self.as_dvec2().dot(other.as_dvec2())
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.as_dvec2().length()
    }

    /// Rotate counter-clockwise (in a y-up frame) by `angle` radians
    #[inline]
    pub fn rotated(self, angle: f64) -> Vector {
        DVec2::from_angle(angle).rotate(self.as_dvec2()).into()
    }
}

impl From<DVec2> for Vector {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

impl std::iter::Sum for Vector {
    fn sum<I: Iterator<Item = Vector>>(iter: I) -> Vector {
        iter.fold(Vector::ZERO, Add::add)
    }
}

/// A location in board space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_dvec2(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance between two locations
    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        self.as_dvec2().distance(other.as_dvec2())
    }
}

impl From<DVec2> for Position {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Displacement from `rhs` to `self`
impl Sub for Position {
    type Output = Vector;

    fn sub(self, rhs: Position) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Position {
    type Output = Position;

    fn add(self, rhs: Vector) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vector> for Position {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}
