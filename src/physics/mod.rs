//! Physics layer: value types, rigid bodies, collisions and the engine that
//! integrates registered bodies.

mod body;
mod collision;
mod vector;
mod world;

pub use body::{BodyId, PhysicsBody, Shape};
pub use collision::{
    Wall, circle_triangle_collision, circles_collide, is_collision, reflect_from_wall,
    resolve_collision,
};
pub use vector::{Position, Vector};
pub use world::{BodyArena, BodyStore, Bounds, PhysicsEngine};
