//! Property tests for board geometry, ball motion and the history log

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use plinko_rewards::consts::{MAX_DROP_STEPS, PEG_ROWS};
use plinko_rewards::history::{History, MAX_HISTORY};
use plinko_rewards::sim::{Ball, BoardKind, Layout, PhysicsParams, StepOutcome, landing_slot, step_ball};

/// Generous upper bound on steps for a drop on any realistic board
const DROP_STEP_BUDGET: u32 = 2_000;

/// Straight count of the staggered grid, independent of `Layout::compute`
fn expected_peg_count(width: f32, n: usize) -> usize {
    let slot_w = width / n as f32;
    let r = (slot_w * 0.18).clamp(4.0, 7.0);
    let (lo, hi) = (r + 4.0, width - r - 4.0);
    let mut count = 0;
    for row in 0..PEG_ROWS {
        let (offset, cols) = if row % 2 == 0 { (slot_w / 2.0, n) } else { (0.0, n + 1) };
        for col in 0..cols {
            if row == PEG_ROWS - 1 && (col == 0 || col == cols - 1) {
                continue;
            }
            let x = offset + col as f32 * slot_w;
            if x > lo && x < hi {
                count += 1;
            }
        }
    }
    count
}

proptest! {
    #[test]
    fn peg_grid_matches_reference_count(
        width in 120u32..900,
        slots in 1usize..16,
    ) {
        let (w, h) = plinko_rewards::surface_size_for_width(width);
        let layout = Layout::compute(w as f32, h as f32, slots).unwrap();
        prop_assert_eq!(layout.pegs.len(), expected_peg_count(w as f32, slots));
        prop_assert_eq!(layout.slot_count, slots);
        prop_assert!((layout.slot_width * slots as f32 - w as f32).abs() < 1e-2);
    }

    #[test]
    fn layout_is_deterministic(width in 120u32..900, slots in 1usize..16) {
        let (w, h) = plinko_rewards::surface_size_for_width(width);
        let a = Layout::compute(w as f32, h as f32, slots);
        let b = Layout::compute(w as f32, h as f32, slots);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pegs_stay_clear_of_walls(width in 120u32..900, slots in 1usize..16) {
        let (w, h) = plinko_rewards::surface_size_for_width(width);
        let layout = Layout::compute(w as f32, h as f32, slots).unwrap();
        for peg in &layout.pegs {
            prop_assert!(peg.pos.x > peg.radius + 4.0);
            prop_assert!(peg.pos.x < w as f32 - peg.radius - 4.0);
        }
    }

    #[test]
    fn landing_slot_always_in_range(x in -1_000.0f32..2_000.0, slots in 1usize..30) {
        let slot = landing_slot(x, 300.0 / slots as f32, slots);
        prop_assert!(slot < slots);
    }

    #[test]
    fn ball_stays_between_walls_and_settles(
        seed in any::<u64>(),
        width in 200u32..800,
        slots in 1usize..12,
    ) {
        let (w, h) = plinko_rewards::surface_size_for_width(width);
        let layout = Layout::compute(w as f32, h as f32, slots).unwrap();
        let params = PhysicsParams::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::launch(&layout, &mut rng);
        let (lo, hi) = layout.wall_bounds(ball.radius, params.wall_margin);

        let mut settled = None;
        for _ in 0..MAX_DROP_STEPS {
            let outcome = step_ball(&mut ball, &layout, &params, &mut rng);
            prop_assert!(ball.pos.x >= lo - 1e-3 && ball.pos.x <= hi + 1e-3,
                "x={} outside [{}, {}]", ball.pos.x, lo, hi);
            prop_assert!(ball.trail.len() <= params.trail_length);
            if let StepOutcome::Settled { slot } = outcome {
                settled = Some(slot);
                break;
            }
        }
        let slot = settled.expect("every drop settles within the step cap");
        prop_assert!(ball.steps < DROP_STEP_BUDGET, "drop took {} steps", ball.steps);
        prop_assert!(slot < slots);
        prop_assert_eq!(ball.pos.y, layout.settle_line(ball.radius));
    }

    #[test]
    fn history_keeps_newest_five(rewards in prop::collection::vec("[a-z]{1,8}", 0..20)) {
        let mut history = History::new();
        for (i, reward) in rewards.iter().enumerate() {
            history.push(BoardKind::Small, reward.clone(), i as f64);
        }
        prop_assert_eq!(history.len(), rewards.len().min(MAX_HISTORY));
        let newest: Vec<&String> = rewards.iter().rev().take(MAX_HISTORY).collect();
        let stored: Vec<&String> = history.entries().iter().map(|e| &e.reward).collect();
        prop_assert_eq!(stored, newest);
    }
}
