//! Board simulation module
//!
//! Layout, ball physics and landing detection. This module must stay free of
//! rendering and platform code:
//! - One fixed step per tick
//! - Randomness only through the caller's RNG
//! - Landing results are cosmetic and never feed reward selection

pub mod collision;
pub mod landing;
pub mod layout;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, ball_peg_collision, reflect_velocity};
pub use landing::landing_slot;
pub use layout::Layout;
pub use state::{Ball, Board, BoardKind, DropPhase, Peg};
pub use tick::{PhysicsParams, StepOutcome, step_ball};
