//! Broad-phase physics engine
//!
//! The engine does not own bodies. It keeps the ids of registered bodies
//! (split into movable and immovable) and reaches the bodies themselves
//! through a [`BodyStore`]. Bodies enter and leave the simulation only via
//! explicit registration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::body::{BodyId, PhysicsBody, Shape};
use super::collision::{Wall, is_collision, reflect_from_wall, resolve_collision};
use crate::consts::FRAMERATE;

/// Axis-aligned play field (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Bounds {
    pub fn new(left: f64, right: f64, upper: f64, lower: f64) -> Self {
        Self {
            left,
            right,
            upper,
            lower,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width() / 2.0
    }
}

/// Lookup of bodies by id
pub trait BodyStore {
    fn body(&self, id: BodyId) -> Option<&PhysicsBody>;
    fn body_mut(&mut self, id: BodyId) -> Option<&mut PhysicsBody>;
}

/// A standalone owner of bodies, for simulations without game entities
#[derive(Debug, Default)]
pub struct BodyArena {
    bodies: BTreeMap<BodyId, PhysicsBody>,
}

impl BodyArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: PhysicsBody) -> BodyId {
        let id = body.id();
        self.bodies.insert(id, body);
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<PhysicsBody> {
        self.bodies.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl BodyStore for BodyArena {
    fn body(&self, id: BodyId) -> Option<&PhysicsBody> {
        self.bodies.get(&id)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut PhysicsBody> {
        self.bodies.get_mut(&id)
    }
}

/// Integrates movable bodies and resolves their collisions
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    bounds: Bounds,
    dt: f64,
    movable: BTreeSet<BodyId>,
    immovable: BTreeSet<BodyId>,
}

impl PhysicsEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self::with_framerate(bounds, FRAMERATE)
    }

    pub fn with_framerate(bounds: Bounds, framerate: u32) -> Self {
        Self {
            bounds,
            dt: 1.0 / f64::from(framerate.max(1)),
            movable: BTreeSet::new(),
            immovable: BTreeSet::new(),
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Seconds simulated per update
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.movable.contains(&id) || self.immovable.contains(&id)
    }

    pub fn movable_count(&self) -> usize {
        self.movable.len()
    }

    pub fn immovable_count(&self) -> usize {
        self.immovable.len()
    }

    /// Ids of every registered body, movable first, each set in id order
    pub fn registered(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.movable.iter().chain(self.immovable.iter()).copied()
    }

    /// Whether `body` collides with any registered body other than itself
    pub fn overlaps_registered<S>(&self, body: &PhysicsBody, store: &S) -> bool
    where
        S: BodyStore + ?Sized,
    {
        self.registered()
            .filter_map(|id| store.body(id))
            .any(|other| is_collision(body, other))
    }

    /// Register the body with the given id.
    ///
    /// Returns false, leaving the engine untouched, if the body is unknown to
    /// `store`, already registered, a movable triangle, or overlapping another
    /// registered body.
    pub fn add_physics_body<S>(&mut self, id: BodyId, store: &S) -> bool
    where
        S: BodyStore + ?Sized,
    {
        let Some(body) = store.body(id) else {
            return false;
        };
        if self.contains(id) {
            return false;
        }
        // Only movable/immovable circles and immovable triangles are simulated
        if body.shape == Shape::EquilateralTriangle && body.is_movable() {
            return false;
        }
        if self.overlaps_registered(body, store) {
            return false;
        }

        if body.is_movable() {
            self.movable.insert(id);
        } else {
            self.immovable.insert(id);
        }
        true
    }

    /// Unregister a body. Returns false if it was not registered.
    pub fn remove_physics_body(&mut self, id: BodyId) -> bool {
        self.movable.remove(&id) || self.immovable.remove(&id)
    }

    /// Whether the body has dropped entirely below the lower boundary
    pub fn is_body_out_of_lower_bound(&self, body: &PhysicsBody) -> bool {
        body.position.y - body.radius > self.bounds.lower
    }

    /// Advance every movable body by one tick.
    ///
    /// Each movable body in turn is integrated, tested against every other
    /// registered body (hit flags are set on both sides of a collision) and
    /// bounced off the left, right and upper walls. The lower boundary is
    /// left to the caller.
    pub fn update<S>(&mut self, store: &mut S)
    where
        S: BodyStore + ?Sized,
    {
        let movable: Vec<BodyId> = self.movable.iter().copied().collect();
        let registered: Vec<BodyId> = self.registered().collect();

        for id in movable {
            let Some(body) = store.body_mut(id) else {
                continue;
            };
            body.step(self.dt);

            for &other_id in &registered {
                if other_id == id {
                    continue;
                }
                let (Some(first), Some(second)) = (store.body(id), store.body(other_id)) else {
                    continue;
                };
                if !is_collision(first, second) {
                    continue;
                }

                let resolved = resolve_collision(first, second);
                if let Some(first) = store.body_mut(id) {
                    first.is_hit = true;
                    if let Some((velocity, _)) = resolved {
                        first.set_velocity(velocity);
                    }
                }
                if let Some(second) = store.body_mut(other_id) {
                    second.is_hit = true;
                    if let Some((_, velocity)) = resolved {
                        second.set_velocity(velocity);
                    }
                }
            }

            if let Some(body) = store.body_mut(id) {
                self.reflect_from_walls(body);
            }
        }
    }

    fn reflect_from_walls(&self, body: &mut PhysicsBody) {
        let mut velocity = body.velocity();
        if body.position.x <= self.bounds.left + body.radius {
            velocity = reflect_from_wall(velocity, Wall::Left, body.elasticity);
        } else if body.position.x >= self.bounds.right - body.radius {
            velocity = reflect_from_wall(velocity, Wall::Right, body.elasticity);
        }
        if body.position.y <= self.bounds.upper + body.radius {
            velocity = reflect_from_wall(velocity, Wall::Upper, body.elasticity);
        }
        body.set_velocity(velocity);
    }
}
