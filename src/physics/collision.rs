//! Collision detection and response
//!
//! Detection supports circle/circle and circle/triangle pairs. Pairs without
//! a circle fall back to comparing circumscribed circles. Response treats the
//! contact as a 1D elastic collision along the line between the centres.

use super::body::{PhysicsBody, Shape};
use super::vector::{Position, Vector};

/// Whether `first` and `second` overlap. A body never collides with itself.
pub fn is_collision(first: &PhysicsBody, second: &PhysicsBody) -> bool {
    if first.id() == second.id() {
        return false;
    }

    match (first.shape, second.shape) {
        (Shape::Circle, Shape::EquilateralTriangle) => {
            circle_triangle_collision(first.position, first.radius, &second.vertices())
        }
        (Shape::EquilateralTriangle, Shape::Circle) => {
            circle_triangle_collision(second.position, second.radius, &first.vertices())
        }
        _ => circles_collide(first.position, first.radius, second.position, second.radius),
    }
}

/// Touching circles count as colliding
#[inline]
pub fn circles_collide(a: Position, a_radius: f64, b: Position, b_radius: f64) -> bool {
    a.distance_to(b) <= a_radius + b_radius
}

/// Circle against a polygon given by its vertices (clockwise)
///
/// A vertex inside the circle is a hit. Otherwise each edge is checked: the
/// centre is projected onto the edge and, if the projection lands on the
/// segment, the perpendicular distance is compared with the radius.
pub fn circle_triangle_collision(center: Position, radius: f64, vertices: &[Position]) -> bool {
    if vertices.iter().any(|v| v.distance_to(center) <= radius) {
        return true;
    }

    let edges = vertices.iter().zip(vertices.iter().cycle().skip(1));

    for (&start, &end) in edges {
        let to_center = (center - start).as_dvec2();
        let edge = (end - start).as_dvec2();
        let len = edge.length();
        if len <= f64::EPSILON {
            continue;
        }

        let projection = to_center.dot(edge) / len;
        if projection > 0.0 && projection < len {
            let perpendicular_sq = (to_center.length_squared() - projection * projection).max(0.0);
            if perpendicular_sq.sqrt() <= radius {
                return true;
            }
        }
    }

    false
}

/// New velocities for a colliding pair, or `None` if the bodies are already
/// separating (which keeps overlapping bodies from re-triggering).
///
/// `first` must be movable. When `second` is immovable, `first` simply has
/// its normal component reversed; otherwise momentum is exchanged by mass.
/// Each result is scaled by its own body's elasticity.
pub fn resolve_collision(first: &PhysicsBody, second: &PhysicsBody) -> Option<(Vector, Vector)> {
    let velocity_diff = first.velocity() - second.velocity();
    let distance_diff = second.position - first.position;

    if velocity_diff.dot(distance_diff) <= 0.0 {
        return None;
    }

    // Rotate so the line of centres lies on the x axis
    let angle = -distance_diff.y.atan2(distance_diff.x);

    let m1 = first.mass;
    let m2 = second.mass;
    let u1 = first.velocity().rotated(angle);
    let u2 = second.velocity().rotated(angle);

    let (v1, v2) = if second.is_movable() {
        let total = m1 + m2;
        (
            Vector::new(u1.x * (m1 - m2) / total + u2.x * 2.0 * m2 / total, u1.y),
            Vector::new(u2.x * (m2 - m1) / total + u1.x * 2.0 * m1 / total, u2.y),
        )
    } else {
        (Vector::new(-u1.x, u1.y), u2)
    };

    Some((
        (v1 * first.elasticity).rotated(-angle),
        (v2 * second.elasticity).rotated(-angle),
    ))
}

/// Which wall a body is pressing against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Upper,
}

/// Reflect the velocity off `wall`, losing energy by elasticity
///
/// Skipped when the velocity already points away from the wall, so a body
/// resting against a wall is not flipped back and forth every tick.
pub fn reflect_from_wall(velocity: Vector, wall: Wall, elasticity: f64) -> Vector {
    match wall {
        Wall::Left if velocity.x < 0.0 => Vector::new(-velocity.x * elasticity, velocity.y),
        Wall::Right if velocity.x > 0.0 => Vector::new(-velocity.x * elasticity, velocity.y),
        Wall::Upper if velocity.y < 0.0 => Vector::new(velocity.x, -velocity.y * elasticity),
        _ => velocity,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_circle_collision_matches_distance(
            ax in -500.0f64..500.0,
            ay in -500.0f64..500.0,
            bx in -500.0f64..500.0,
            by in -500.0f64..500.0,
            ar in 1.0f64..60.0,
            br in 1.0f64..60.0,
        ) {
            let a = PhysicsBody::new(true, ar, Position::new(ax, ay));
            let b = PhysicsBody::new(false, br, Position::new(bx, by));
            let expected = a.distance_from(&b) <= ar + br;
            prop_assert_eq!(is_collision(&a, &b), expected);
            prop_assert_eq!(is_collision(&b, &a), expected);
            prop_assert!(!is_collision(&a, &a));
        }

        #[test]
        fn prop_far_circles_miss_triangles(
            angle in 0.0f64..std::f64::consts::TAU,
            rotation in 0.0f64..std::f64::consts::TAU,
            gap in 0.01f64..200.0,
        ) {
            let tri = PhysicsBody::new(false, 20.0, Position::new(0.0, 0.0))
                .with_shape(Shape::EquilateralTriangle, rotation);
            let distance = 20.0 + 10.0 + gap;
            let ball = PhysicsBody::new(
                true,
                10.0,
                Position::new(distance * angle.cos(), distance * angle.sin()),
            );
            prop_assert!(!is_collision(&ball, &tri));
        }
    }
}
