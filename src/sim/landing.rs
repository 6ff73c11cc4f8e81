//! Landing detection
//!
//! Maps a resting ball to the slot it visually sits in. The result only drives
//! the slot highlight; reward selection never reads it.

/// Slot under horizontal position `x`, clamped to `[0, slot_count - 1]`
#[inline]
pub fn landing_slot(x: f32, slot_width: f32, slot_count: usize) -> usize {
    let last = slot_count.saturating_sub(1);
    let raw = (x / slot_width).floor().max(0.0);
    // Float-to-int casts saturate, so oversized or NaN values stay in range
    (raw as usize).min(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_slot_basic() {
        assert_eq!(landing_slot(0.0, 60.0, 5), 0);
        assert_eq!(landing_slot(59.9, 60.0, 5), 0);
        assert_eq!(landing_slot(60.0, 60.0, 5), 1);
        assert_eq!(landing_slot(150.0, 60.0, 5), 2);
    }

    #[test]
    fn test_landing_slot_clamps_high() {
        assert_eq!(landing_slot(300.0, 60.0, 5), 4);
        assert_eq!(landing_slot(10_000.0, 60.0, 5), 4);
    }

    #[test]
    fn test_landing_slot_clamps_low() {
        assert_eq!(landing_slot(-5.0, 60.0, 5), 0);
        assert_eq!(landing_slot(f32::NAN, 60.0, 5), 0);
    }

    #[test]
    fn test_single_slot() {
        assert_eq!(landing_slot(250.0, 300.0, 1), 0);
    }
}
