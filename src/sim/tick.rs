//! Fixed-step ball advance
//!
//! One call to `step_ball` is one display refresh worth of motion. The step
//! only reads the ball, the current layout, the tuning parameters and the
//! random source, so tests can drive it with a plain loop.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{resolve_peg_collision, resolve_wall_collision, resolve_wall_wedge};
use super::landing::landing_slot;
use super::layout::Layout;
use super::state::Ball;
use crate::consts::*;

/// Per-step physics tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Added to vy every step
    pub gravity: f32,
    /// vx multiplier every step
    pub friction: f32,
    /// Velocity scale after a peg bounce
    pub peg_bounce: f32,
    /// Velocity scale after a wall bounce
    pub wall_bounce: f32,
    /// Gap between the ball and each side wall
    pub wall_margin: f32,
    pub trail_length: usize,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            peg_bounce: PEG_BOUNCE,
            wall_bounce: WALL_BOUNCE,
            wall_margin: WALL_MARGIN,
            trail_length: TRAIL_LENGTH,
        }
    }
}

impl PhysicsParams {
    /// Replace unusable values with defaults. Gravity must stay positive or a
    /// drop could never reach the settle line.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        Self {
            gravity: if self.gravity.is_finite() && self.gravity > 0.0 {
                self.gravity
            } else {
                defaults.gravity
            },
            friction: if valid(self.friction) && self.friction <= 1.0 {
                self.friction
            } else {
                defaults.friction
            },
            peg_bounce: if valid(self.peg_bounce) { self.peg_bounce } else { defaults.peg_bounce },
            wall_bounce: if valid(self.wall_bounce) { self.wall_bounce } else { defaults.wall_bounce },
            wall_margin: if valid(self.wall_margin) { self.wall_margin } else { defaults.wall_margin },
            trail_length: self.trail_length,
        }
    }
}

/// What happened during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still above the settle line
    Falling,
    /// Reached the settle line and stopped in `slot` (decorative only)
    Settled { slot: usize },
}

/// Watch for a ball caught in a gap narrower than itself.
///
/// Once it has made no downward progress for `STALL_STEPS`, pegs are ignored
/// until it has fallen one contact distance, which carries it below the pegs
/// holding it.
fn track_descent(ball: &mut Ball, peg_radius: f32) {
    if ball.pos.y > ball.low_water + STALL_PROGRESS {
        ball.low_water = ball.pos.y;
        ball.stalled_for = 0;
        return;
    }
    ball.stalled_for += 1;
    if ball.stalled_for >= STALL_STEPS {
        let target = ball.pos.y + ball.radius + peg_radius + PEG_CONTACT_GAP;
        log::debug!(
            "Ball stalled at ({:.1}, {:.1}); passing pegs down to y={:.1}",
            ball.pos.x,
            ball.pos.y,
            target
        );
        ball.pass_through_to = Some(target);
        ball.stalled_for = 0;
    }
}

/// Advance the ball by one step against `layout`
pub fn step_ball<R: Rng + ?Sized>(
    ball: &mut Ball,
    layout: &Layout,
    params: &PhysicsParams,
    rng: &mut R,
) -> StepOutcome {
    ball.steps += 1;

    // Integrate
    ball.vel.y += params.gravity;
    ball.vel.x *= params.friction;
    ball.pos += ball.vel;

    ball.record_trail(params.trail_length);

    resolve_wall_collision(ball, layout.width, params);

    if ball.pass_through_to.is_some_and(|y| ball.pos.y >= y) {
        ball.pass_through_to = None;
    }
    if ball.pass_through_to.is_none() {
        for peg in &layout.pegs {
            resolve_peg_collision(ball, peg, params, rng);
        }
    }

    // Peg push-out may shove the ball past a wall; clamp again
    if resolve_wall_collision(ball, layout.width, params) {
        for peg in &layout.pegs {
            resolve_wall_wedge(ball, peg, layout.width, params);
        }
    }

    track_descent(ball, layout.peg_radius);

    let settle_y = layout.settle_line(ball.radius);
    if ball.pos.y >= settle_y || ball.steps >= MAX_DROP_STEPS {
        if ball.pos.y < settle_y {
            log::warn!("Ball hit the step cap at y={:.1}; forcing settle", ball.pos.y);
        }
        ball.pos.y = settle_y;
        ball.vel = glam::Vec2::ZERO;
        let slot = landing_slot(ball.pos.x, layout.slot_width, layout.slot_count);
        return StepOutcome::Settled { slot };
    }

    StepOutcome::Falling
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_to_settle(seed: u64, slots: usize) -> (Ball, usize) {
        let layout = Layout::compute(300.0, 450.0, slots).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::launch(&layout, &mut rng);
        loop {
            if let StepOutcome::Settled { slot } = step_ball(&mut ball, &layout, &params, &mut rng) {
                return (ball, slot);
            }
        }
    }

    fn steps_to_settle(width: f32, height: f32, slots: usize, seed: u64) -> u32 {
        let layout = Layout::compute(width, height, slots).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::launch(&layout, &mut rng);
        while step_ball(&mut ball, &layout, &params, &mut rng) == StepOutcome::Falling {}
        ball.steps
    }

    #[test]
    fn test_ball_pinned_at_wall_rolls_off_peg() {
        let layout = Layout::compute(300.0, 450.0, 6).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(19);
        // Resting on the first peg of a row, clamped to the left wall
        let mut ball = Ball::new(Vec2::new(13.0, 244.8), Vec2::new(0.067, 0.5), 10.0);

        step_ball(&mut ball, &layout, &params, &mut rng);
        assert!(ball.pos.x > 25.0, "still wedged at x={}", ball.pos.x);

        while step_ball(&mut ball, &layout, &params, &mut rng) == StepOutcome::Falling {}
        assert!(ball.steps < 2_000, "took {} steps", ball.steps);
    }

    #[test]
    fn test_drops_finish_long_before_step_cap() {
        let boards = [
            (300.0, 450.0, 6),
            (240.0, 360.0, 5),
            (200.0, 300.0, 5),
            (160.0, 240.0, 4),
            (200.0, 300.0, 11),
        ];
        for (w, h, n) in boards {
            for seed in 0..40 {
                let steps = steps_to_settle(w, h, n, seed);
                assert!(steps < 2_000, "{w}x{h} n={n} seed {seed}: {steps} steps");
            }
        }
        assert!(steps_to_settle(300.0, 450.0, 6, 19) < 2_000);
    }

    #[test]
    fn test_stall_switches_on_pass_through() {
        let mut ball = Ball::new(Vec2::new(90.0, 60.0), Vec2::ZERO, 5.0);
        for _ in 0..STALL_STEPS - 1 {
            track_descent(&mut ball, 4.0);
        }
        assert_eq!(ball.pass_through_to, None);

        track_descent(&mut ball, 4.0);
        assert_eq!(ball.pass_through_to, Some(60.0 + 5.0 + 4.0 + PEG_CONTACT_GAP));
        assert_eq!(ball.stalled_for, 0);
    }

    #[test]
    fn test_descent_resets_stall_count() {
        let mut ball = Ball::new(Vec2::new(90.0, 60.0), Vec2::ZERO, 5.0);
        for _ in 0..STALL_STEPS - 1 {
            track_descent(&mut ball, 4.0);
        }
        ball.pos.y += 2.0;
        track_descent(&mut ball, 4.0);
        assert_eq!(ball.stalled_for, 0);
        assert_eq!(ball.low_water, 62.0);
        assert_eq!(ball.pass_through_to, None);
    }

    #[test]
    fn test_pass_through_ignores_pegs_until_target() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let peg = layout.pegs[0].pos;
        let mut ball = Ball::new(peg - Vec2::new(0.0, 5.0), Vec2::ZERO, 10.0);
        ball.pass_through_to = Some(peg.y + 20.0);

        step_ball(&mut ball, &layout, &params, &mut rng);
        assert_eq!(ball.pos.x, peg.x);
        assert!((ball.pos.y - (peg.y - 5.0 + params.gravity)).abs() < 1e-4);
        assert!(ball.pass_through_to.is_some());
    }

    #[test]
    fn test_first_step_integrates_gravity() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ball = Ball::new(Vec2::new(150.0, 28.0), Vec2::new(0.2, 0.4), 10.0);

        let outcome = step_ball(&mut ball, &layout, &params, &mut rng);
        assert_eq!(outcome, StepOutcome::Falling);
        assert!((ball.vel.y - 0.5).abs() < 1e-6);
        assert!((ball.vel.x - 0.2 * FRICTION).abs() < 1e-6);
        assert!((ball.pos.y - 28.5).abs() < 1e-5);
        assert_eq!(ball.trail.len(), 1);
    }

    #[test]
    fn test_drop_settles_on_settle_line() {
        for seed in 0..20 {
            let (ball, slot) = run_to_settle(seed, 5);
            assert!(slot < 5);
            assert!((ball.pos.y - (450.0 - 78.0 - ball.radius)).abs() < 1e-4);
            assert_eq!(ball.vel, Vec2::ZERO);
            assert!(ball.steps < MAX_DROP_STEPS);
        }
    }

    #[test]
    fn test_landing_matches_resting_position() {
        let (ball, slot) = run_to_settle(42, 6);
        assert_eq!(slot, landing_slot(ball.pos.x, 50.0, 6));
    }

    #[test]
    fn test_same_seed_same_path() {
        let (a, slot_a) = run_to_settle(777, 8);
        let (b, slot_b) = run_to_settle(777, 8);
        assert_eq!(slot_a, slot_b);
        assert_eq!(a.steps, b.steps);
        assert_eq!(a.pos, b.pos);
    }

    #[test]
    fn test_step_cap_forces_settle() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ball = Ball::new(Vec2::new(150.0, 28.0), Vec2::ZERO, 10.0);
        ball.steps = MAX_DROP_STEPS - 1;
        let outcome = step_ball(&mut ball, &layout, &params, &mut rng);
        assert!(matches!(outcome, StepOutcome::Settled { .. }));
        assert!((ball.pos.y - layout.settle_line(10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_sanitized_rejects_non_positive_gravity() {
        let params = PhysicsParams {
            gravity: 0.0,
            friction: 2.0,
            ..PhysicsParams::default()
        }
        .sanitized();
        assert_eq!(params.gravity, GRAVITY);
        assert_eq!(params.friction, FRICTION);
    }
}
