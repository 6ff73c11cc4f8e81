//! Collision detection and response for the ball against pegs and side walls
//!
//! Peg response reflects the velocity about the contact normal, damps it, and
//! adds a downward nudge plus a small random sideways kick so the ball cannot
//! park in a peg gap. The kick is cosmetic; it never looks at rewards.

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, Peg};
use super::tick::PhysicsParams;
use crate::consts::*;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal pointing from the obstacle toward the ball center
    pub normal: Vec2,
    /// Distance the ball must move along `normal` to clear the obstacle
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

/// Check a ball against a single peg.
///
/// Contact distance includes a one-unit gap. Exact overlap (distance below
/// `CONTACT_EPSILON`) is reported as a miss because it has no usable normal.
pub fn ball_peg_collision(ball_pos: Vec2, ball_radius: f32, peg: &Peg) -> CollisionResult {
    let delta = ball_pos - peg.pos;
    let dist = delta.length();
    let min_dist = ball_radius + peg.radius + PEG_CONTACT_GAP;

    if dist < min_dist && dist > CONTACT_EPSILON {
        let normal = delta / dist;
        return CollisionResult {
            hit: true,
            normal,
            penetration: min_dist - dist,
        };
    }

    CollisionResult::miss()
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Push the ball out of a peg and bounce it. Returns true on contact.
pub fn resolve_peg_collision<R: Rng + ?Sized>(
    ball: &mut Ball,
    peg: &Peg,
    params: &PhysicsParams,
    rng: &mut R,
) -> bool {
    let result = ball_peg_collision(ball.pos, ball.radius, peg);
    if !result.hit {
        return false;
    }

    ball.pos += result.normal * result.penetration;

    let mut vel = reflect_velocity(ball.vel, result.normal) * params.peg_bounce;
    vel.y += PEG_DOWN_BIAS;
    vel.x += (rng.random::<f32>() - 0.5) * PEG_SCATTER;
    if vel.y < PEG_MIN_VY {
        vel.y = PEG_MIN_VY;
    }
    ball.vel = vel;
    true
}

/// Free a ball pinned between a side wall and a peg.
///
/// Near a wall the peg push-out and the wall clamp can undo each other every
/// step, leaving the ball hovering on the peg with no way down. When the
/// clamped ball still overlaps `peg`, it is rolled over the peg to the side
/// facing away from the wall. If that side has no room either, it drops to
/// just below the peg. Returns true if the ball was moved.
pub fn resolve_wall_wedge(
    ball: &mut Ball,
    peg: &Peg,
    width: f32,
    params: &PhysicsParams,
) -> bool {
    let min_x = params.wall_margin + ball.radius;
    let max_x = width - params.wall_margin - ball.radius;
    let away = if ball.pos.x <= min_x + CONTACT_EPSILON {
        1.0
    } else if ball.pos.x >= max_x - CONTACT_EPSILON {
        -1.0
    } else {
        return false;
    };

    if !ball_peg_collision(ball.pos, ball.radius, peg).hit {
        return false;
    }

    let min_dist = ball.radius + peg.radius + PEG_CONTACT_GAP;
    let dx = ball.pos.x - peg.pos.x;
    let rise = (min_dist * min_dist - dx * dx).max(0.0).sqrt();

    let over_x = peg.pos.x - dx;
    if ball.pos.y < peg.pos.y && over_x > min_x && over_x < max_x {
        ball.pos = Vec2::new(over_x, peg.pos.y - rise);
        ball.vel.x = away * ball.vel.x.abs().max(WEDGE_ROLL_SPEED);
    } else {
        ball.pos.y = peg.pos.y + rise;
    }
    ball.vel.y = ball.vel.y.max(PEG_MIN_VY);
    true
}

/// Clamp the ball inside the side walls, bouncing it back inward.
/// Returns true if a wall was touched.
pub fn resolve_wall_collision(ball: &mut Ball, width: f32, params: &PhysicsParams) -> bool {
    let min_x = params.wall_margin + ball.radius;
    let max_x = width - params.wall_margin - ball.radius;

    if ball.pos.x < min_x {
        ball.pos.x = min_x;
        ball.vel.x = ball.vel.x.abs() * params.wall_bounce;
        true
    } else if ball.pos.x > max_x {
        ball.pos.x = max_x;
        ball.vel.x = -ball.vel.x.abs() * params.wall_bounce;
        true
    } else {
        false
    }
}
