//! Collision detection and response
//!
//! Walls and playfield edges are axis-aligned, so every bounce is resolved
//! along a single axis: the position is snapped out along the axis of least
//! penetration and only that axis's velocity component is reflected.
//! Reflecting both components lets fast bodies tunnel through corners.

use glam::Vec2;

use super::bodies::{BodyRegistry, Wall};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::tuning::Tuning;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Axis-aligned unit normal pointing out of the wall, toward the body
    pub normal: Vec2,
    /// Penetration depth along `normal`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned wall
///
/// On overlap, returns the side with the smallest penetration depth: the
/// shortest way out of the rectangle.
pub fn circle_wall_collision(pos: Vec2, radius: f32, wall: &Wall) -> CollisionResult {
    if !wall.overlaps_circle(pos, radius) {
        return CollisionResult::miss();
    }

    let (min, max) = (wall.min(), wall.max());
    let sides = [
        (pos.x + radius - min.x, Vec2::NEG_X), // exit through left side
        (max.x - (pos.x - radius), Vec2::X),   // right
        (pos.y + radius - min.y, Vec2::NEG_Y), // top
        (max.y - (pos.y - radius), Vec2::Y),   // bottom
    ];

    let (penetration, normal) = sides
        .into_iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, Vec2::ZERO));

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Push a body out of a wall and bounce it along the penetration axis
///
/// Returns true if the body was touching the wall.
pub fn resolve_wall(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    wall: &Wall,
    restitution: f32,
) -> bool {
    let result = circle_wall_collision(*pos, radius, wall);
    if !result.hit {
        return false;
    }

    if result.normal.x != 0.0 {
        pos.x = if result.normal.x < 0.0 {
            wall.x - radius
        } else {
            wall.x + wall.w + radius
        };
        // Only reflect if moving into the wall
        if vel.x * result.normal.x < 0.0 {
            vel.x = -vel.x * restitution;
        }
    } else {
        pos.y = if result.normal.y < 0.0 {
            wall.y - radius
        } else {
            wall.y + wall.h + radius
        };
        if vel.y * result.normal.y < 0.0 {
            vel.y = -vel.y * restitution;
        }
    }
    true
}

/// Keep a body inside the playfield, bouncing off each edge independently
///
/// Returns true if any edge was hit.
pub fn resolve_bounds(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    size: Vec2,
    restitution: f32,
) -> bool {
    let mut hit = false;

    if pos.x - radius < 0.0 {
        pos.x = radius;
        if vel.x < 0.0 {
            vel.x = -vel.x * restitution;
        }
        hit = true;
    } else if pos.x + radius > size.x {
        pos.x = size.x - radius;
        if vel.x > 0.0 {
            vel.x = -vel.x * restitution;
        }
        hit = true;
    }

    if pos.y - radius < 0.0 {
        pos.y = radius;
        if vel.y < 0.0 {
            vel.y = -vel.y * restitution;
        }
        hit = true;
    } else if pos.y + radius > size.y {
        pos.y = size.y - radius;
        if vel.y > 0.0 {
            vel.y = -vel.y * restitution;
        }
        hit = true;
    }

    hit
}

/// Whether two circles touch (distance ≤ sum of radii)
#[inline]
pub fn circles_touch(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// A proximity event raised for the state machine and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Collectible at index was picked up (first touch only)
    Collected(usize),
    /// Particle touched the debris at index
    Struck(usize),
    /// Particle reached the goal
    GoalReached,
}

/// Resolve wall and edge bounces for every dynamic body
///
/// Returns the number of bounces the particle made this tick.
pub fn resolve_bodies(bodies: &mut BodyRegistry, tuning: &Tuning) -> u32 {
    let size = Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    let mut particle_bounces = 0;

    let particle = &mut bodies.particle;
    for wall in &bodies.walls {
        if resolve_wall(
            &mut particle.pos,
            &mut particle.vel,
            particle.radius,
            wall,
            tuning.wall_restitution,
        ) {
            particle_bounces += 1;
        }
    }
    if resolve_bounds(
        &mut particle.pos,
        &mut particle.vel,
        particle.radius,
        size,
        tuning.boundary_restitution,
    ) {
        particle_bounces += 1;
    }

    for debris in &mut bodies.debris {
        for wall in &bodies.walls {
            resolve_wall(
                &mut debris.pos,
                &mut debris.vel,
                debris.radius,
                wall,
                tuning.wall_restitution,
            );
        }
        resolve_bounds(
            &mut debris.pos,
            &mut debris.vel,
            debris.radius,
            size,
            tuning.boundary_restitution,
        );
    }

    particle_bounces
}

/// Detect particle proximity events
///
/// Collectibles flip their flag here and are reported only on the first
/// touch. Order: collectibles, then debris strikes, then the goal.
pub fn detect_contacts(bodies: &mut BodyRegistry) -> Vec<Contact> {
    let mut contacts = Vec::new();
    let p = &bodies.particle;

    for (i, c) in bodies.collectibles.iter_mut().enumerate() {
        if !c.collected && circles_touch(p.pos, p.radius, c.pos, c.radius) && c.collect() {
            contacts.push(Contact::Collected(i));
        }
    }

    if let Some(i) = bodies
        .debris
        .iter()
        .position(|d| circles_touch(p.pos, p.radius, d.pos, d.radius))
    {
        contacts.push(Contact::Struck(i));
    }

    if circles_touch(p.pos, p.radius, bodies.goal.pos, bodies.goal.radius) {
        contacts.push(Contact::GoalReached);
    }

    contacts
}
