//! Board geometry: slot widths and the staggered peg grid
//!
//! Layout is a pure function of surface size and slot count. No randomness,
//! so recomputing with the same inputs yields the same pegs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Peg;
use crate::consts::*;

/// Derived board geometry, rebuilt whenever the surface or item count changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Surface width
    pub width: f32,
    /// Surface height
    pub height: f32,
    /// Number of slots (one per reward item)
    pub slot_count: usize,
    pub slot_width: f32,
    /// Top of the peg band
    pub top_pad: f32,
    /// Vertical distance between peg rows
    pub row_height: f32,
    pub peg_radius: f32,
    pub pegs: Vec<Peg>,
}

impl Layout {
    /// Compute layout for a `width` x `height` surface with `slot_count` slots.
    ///
    /// Returns `None` when there are no slots; the board then shows its
    /// placeholder and refuses drops.
    pub fn compute(width: f32, height: f32, slot_count: usize) -> Option<Self> {
        if slot_count == 0 {
            return None;
        }

        let slot_width = width / slot_count as f32;
        let usable_height = (height - TOP_PAD - BOTTOM_PAD).max(0.0);
        let row_height = usable_height / PEG_ROWS as f32;
        let peg_radius = (slot_width * PEG_RADIUS_SCALE).clamp(PEG_RADIUS_MIN, PEG_RADIUS_MAX);

        let min_x = peg_radius + PEG_WALL_MARGIN;
        let max_x = width - peg_radius - PEG_WALL_MARGIN;

        let mut pegs = Vec::new();
        for row in 0..PEG_ROWS {
            let is_last_row = row == PEG_ROWS - 1;
            // Even rows sit between slot centers, odd rows on slot edges
            let (offset, cols) = if row % 2 == 0 {
                (slot_width / 2.0, slot_count)
            } else {
                (0.0, slot_count + 1)
            };
            let y = TOP_PAD + row as f32 * row_height + row_height * 0.5;

            for col in 0..cols {
                // Corner pegs on the last row trap the ball against the walls
                if is_last_row && (col == 0 || col == cols - 1) {
                    continue;
                }
                let x = offset + col as f32 * slot_width;
                if x > min_x && x < max_x {
                    pegs.push(Peg::new(Vec2::new(x, y), peg_radius));
                }
            }
        }

        Some(Self {
            width,
            height,
            slot_count,
            slot_width,
            top_pad: TOP_PAD,
            row_height,
            peg_radius,
            pegs,
        })
    }

    /// Radius of a ball dropped on this board
    #[inline]
    pub fn ball_radius(&self) -> f32 {
        (self.slot_width * BALL_RADIUS_SCALE).clamp(BALL_RADIUS_MIN, BALL_RADIUS_MAX)
    }

    /// Top edge of the slot band
    #[inline]
    pub fn slot_band_top(&self) -> f32 {
        self.height - SLOT_BAND_HEIGHT
    }

    /// Vertical position at which a ball of `ball_radius` has landed
    #[inline]
    pub fn settle_line(&self, ball_radius: f32) -> f32 {
        self.slot_band_top() - ball_radius
    }

    /// Left edge of slot `index`
    #[inline]
    pub fn slot_left(&self, index: usize) -> f32 {
        index as f32 * self.slot_width
    }

    /// Allowed x range for a ball center of `ball_radius`
    #[inline]
    pub fn wall_bounds(&self, ball_radius: f32, margin: f32) -> (f32, f32) {
        (margin + ball_radius, self.width - margin - ball_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_slots_has_no_layout() {
        assert!(Layout::compute(300.0, 450.0, 0).is_none());
    }

    #[test]
    fn test_five_slots_on_300_wide_board() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        assert!((layout.slot_width - 60.0).abs() < 1e-4);
        // 60 * 0.18 = 10.8, clamped to 7
        assert!((layout.peg_radius - 7.0).abs() < 1e-4);
        // Even rows: 5 pegs, odd rows: 4 (wall pegs culled), last row: 3
        assert_eq!(layout.pegs.len(), 5 * 3 + 4 * 3 + 3);
    }

    #[test]
    fn test_last_row_drops_corner_pegs() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        let last_y = layout.pegs.last().unwrap().pos.y;
        let last_row: Vec<f32> = layout
            .pegs
            .iter()
            .filter(|p| (p.pos.y - last_y).abs() < 1e-3)
            .map(|p| p.pos.x)
            .collect();
        assert_eq!(last_row, vec![90.0, 150.0, 210.0]);
    }

    #[test]
    fn test_rows_are_staggered() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        let first = &layout.pegs[0];
        assert!((first.pos.x - 30.0).abs() < 1e-4);
        // Second row begins at x = 60 once the x = 0 wall peg is culled
        let second_row_first = layout
            .pegs
            .iter()
            .find(|p| p.pos.y > first.pos.y + 1.0)
            .unwrap();
        assert!((second_row_first.pos.x - 60.0).abs() < 1e-4);
        assert!((second_row_first.pos.y - first.pos.y - layout.row_height).abs() < 1e-3);
    }

    #[test]
    fn test_peg_radius_clamped_low() {
        // 40 slots on 300px -> 7.5px slots -> 1.35 radius, clamped up to 4
        let layout = Layout::compute(300.0, 450.0, 40).unwrap();
        assert!((layout.peg_radius - PEG_RADIUS_MIN).abs() < 1e-4);
    }

    #[test]
    fn test_pegs_clear_of_walls() {
        for n in 1..12 {
            let layout = Layout::compute(240.0, 360.0, n).unwrap();
            for peg in &layout.pegs {
                assert!(peg.pos.x > layout.peg_radius + PEG_WALL_MARGIN);
                assert!(peg.pos.x < layout.width - layout.peg_radius - PEG_WALL_MARGIN);
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = Layout::compute(333.0, 500.0, 7).unwrap();
        let b = Layout::compute(333.0, 500.0, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_settle_line_and_ball_radius() {
        let layout = Layout::compute(300.0, 450.0, 5).unwrap();
        // 60 * 0.22 = 13.2, clamped to 10
        assert!((layout.ball_radius() - 10.0).abs() < 1e-4);
        assert!((layout.settle_line(10.0) - (450.0 - 78.0 - 10.0)).abs() < 1e-4);
    }
}
