//! Plinko Rewards - a peg board that drops a ball while the prize is drawn separately
//!
//! Core modules:
//! - `sim`: Board geometry, ball physics, landing detection
//! - `reward`: Reward list loading and the independent uniform reward draw
//! - `session`: Two boards, a shared RNG, the drop lock and the reveal delay
//! - `renderer`: Vertex generation and the WebGPU pipeline
//! - `history`: Rolling log of recent rewards
//! - `settings`: Physics tuning and render quality

pub mod history;
pub mod renderer;
pub mod reward;
pub mod session;
pub mod settings;
pub mod sim;

pub use history::{History, HistoryEntry};
pub use session::{DropOutcome, DropTicket, Session, SessionEvent};
pub use settings::{QualityPreset, Settings};

/// Board configuration constants
pub mod consts {
    /// Number of peg rows on every board
    pub const PEG_ROWS: usize = 7;
    /// Space above the first peg row (drop zone)
    pub const TOP_PAD: f32 = 52.0;
    /// Space below the last peg row; equals the slot band height
    pub const BOTTOM_PAD: f32 = 78.0;
    /// Height of the slot band at the bottom of the board
    pub const SLOT_BAND_HEIGHT: f32 = 78.0;

    /// Peg radius as a fraction of slot width, clamped to [PEG_RADIUS_MIN, PEG_RADIUS_MAX]
    pub const PEG_RADIUS_SCALE: f32 = 0.18;
    pub const PEG_RADIUS_MIN: f32 = 4.0;
    pub const PEG_RADIUS_MAX: f32 = 7.0;
    /// Extra clearance between a peg and a side wall
    pub const PEG_WALL_MARGIN: f32 = 4.0;

    /// Ball radius as a fraction of slot width, clamped to [BALL_RADIUS_MIN, BALL_RADIUS_MAX]
    pub const BALL_RADIUS_SCALE: f32 = 0.22;
    pub const BALL_RADIUS_MIN: f32 = 5.0;
    pub const BALL_RADIUS_MAX: f32 = 10.0;
    /// Launch height of a fresh ball
    pub const BALL_START_Y: f32 = 28.0;
    /// Horizontal launch jitter, in slot widths
    pub const BALL_START_SPREAD: f32 = 1.2;
    /// Initial velocity jitter / downward speed
    pub const BALL_START_VX_SPREAD: f32 = 0.4;
    pub const BALL_START_VY: f32 = 0.4;

    /// Per-step physics defaults (one step per display refresh)
    pub const GRAVITY: f32 = 0.10;
    pub const FRICTION: f32 = 0.992;
    pub const PEG_BOUNCE: f32 = 0.35;
    pub const WALL_BOUNCE: f32 = 0.30;
    pub const WALL_MARGIN: f32 = 3.0;
    /// Gap kept between ball and peg surfaces after push-out
    pub const PEG_CONTACT_GAP: f32 = 1.0;
    /// Distances below this are treated as exact overlap and skipped
    pub const CONTACT_EPSILON: f32 = 0.001;
    /// Downward nudge added after every peg bounce
    pub const PEG_DOWN_BIAS: f32 = 0.25;
    /// Minimum vertical speed after a peg bounce
    pub const PEG_MIN_VY: f32 = 0.5;
    /// Width of the random horizontal kick on a peg bounce
    pub const PEG_SCATTER: f32 = 1.0;
    /// Minimum sideways speed of a ball freed from a wall-peg wedge
    pub const WEDGE_ROLL_SPEED: f32 = 0.5;

    /// Trail positions kept per ball
    pub const TRAIL_LENGTH: usize = 12;
    /// Steps without `STALL_PROGRESS` px of descent before a ball squeezes past pegs
    pub const STALL_STEPS: u32 = 90;
    pub const STALL_PROGRESS: f32 = 1.0;
    /// Last-resort stop for a single drop
    pub const MAX_DROP_STEPS: u32 = 10_000;

    /// Delay between landing and reward reveal (450 ms at 60 Hz)
    pub const REVEAL_DELAY_TICKS: u32 = 27;
    /// Surface height as a multiple of its width
    pub const SURFACE_ASPECT: f32 = 1.5;
}

/// Surface size for a container of the given width (height follows the board aspect)
#[inline]
pub fn surface_size_for_width(width: u32) -> (u32, u32) {
    let height = (width as f32 * consts::SURFACE_ASPECT).round() as u32;
    (width, height)
}

/// Unix time in milliseconds from the host clock
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Unix time in milliseconds from the host clock
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_for_width() {
        assert_eq!(surface_size_for_width(300), (300, 450));
        assert_eq!(surface_size_for_width(301), (301, 452));
    }
}
