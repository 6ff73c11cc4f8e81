//! Board state and core simulation types
//!
//! A `Board` owns its layout (and thus its pegs) and at most one in-flight
//! ball. Everything here is driven by an explicit `tick`; there is no
//! global state.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::layout::Layout;
use super::tick::{PhysicsParams, StepOutcome, step_ball};
use crate::consts::*;

/// Which of the two reward boards this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    Big,
    Small,
}

impl BoardKind {
    pub const ALL: [BoardKind; 2] = [BoardKind::Big, BoardKind::Small];

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardKind::Big => "big",
            BoardKind::Small => "small",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "big" => Some(BoardKind::Big),
            "small" => Some(BoardKind::Small),
            _ => None,
        }
    }

    /// Stable index for per-kind arrays
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            BoardKind::Big => 0,
            BoardKind::Small => 1,
        }
    }

    /// Default reward list resource for this board
    pub fn reward_file(&self) -> &'static str {
        match self {
            BoardKind::Big => "rewards_big.txt",
            BoardKind::Small => "rewards_small.txt",
        }
    }

    /// Heading for the result popup
    pub fn result_label(&self) -> &'static str {
        match self {
            BoardKind::Big => "Big Reward!",
            BoardKind::Small => "Small Reward!",
        }
    }

    /// Whether a reveal on this board should trigger confetti
    pub fn celebrates(&self) -> bool {
        *self == BoardKind::Big
    }
}

/// A fixed peg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
}

impl Peg {
    pub const fn new(pos: Vec2, radius: f32) -> Self {
        Self { pos, radius }
    }
}

/// The falling ball; lives for a single drop
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Recent positions, oldest first
    pub trail: VecDeque<Vec2>,
    /// Steps taken since launch
    pub steps: u32,
    /// Deepest y reached so far
    pub low_water: f32,
    /// Steps since `low_water` last moved down
    pub stalled_for: u32,
    /// While set and the ball is above this y, pegs are ignored
    pub pass_through_to: Option<f32>,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel,
            radius,
            trail: VecDeque::with_capacity(TRAIL_LENGTH + 1),
            steps: 0,
            low_water: pos.y,
            stalled_for: 0,
            pass_through_to: None,
        }
    }

    /// Launch a ball near the top center with a little random spread
    pub fn launch<R: Rng + ?Sized>(layout: &Layout, rng: &mut R) -> Self {
        let x = layout.width / 2.0
            + (rng.random::<f32>() - 0.5) * layout.slot_width * BALL_START_SPREAD;
        let vx = (rng.random::<f32>() - 0.5) * BALL_START_VX_SPREAD;
        Self::new(
            Vec2::new(x, BALL_START_Y),
            Vec2::new(vx, BALL_START_VY),
            layout.ball_radius(),
        )
    }

    /// Append current position to the trail, discarding the oldest past `max_len`
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.push_back(self.pos);
        while self.trail.len() > max_len {
            self.trail.pop_front();
        }
    }
}

/// Drop lifecycle of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPhase {
    /// No drop has run yet
    Idle,
    /// A ball is falling
    Dropping,
    /// Last ball came to rest; a new drop may start
    Settled,
}

/// Completion handler receiving the decorative landing slot
pub type LandCallback = Box<dyn FnOnce(usize)>;

/// One Plinko board: reward labels, geometry and drop state
pub struct Board {
    kind: BoardKind,
    items: Vec<String>,
    width: f32,
    height: f32,
    layout: Option<Layout>,
    phase: DropPhase,
    ball: Option<Ball>,
    /// Slot lit after landing (visual only)
    highlight: Option<usize>,
    /// Why the reward list could not be loaded, if it could not
    load_error: Option<String>,
    params: PhysicsParams,
    on_land: Option<LandCallback>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("kind", &self.kind)
            .field("items", &self.items.len())
            .field("size", &(self.width, self.height))
            .field("phase", &self.phase)
            .field("highlight", &self.highlight)
            .field("load_error", &self.load_error)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Create an empty board; it stays unusable until items are set
    pub fn new(kind: BoardKind, width: f32, height: f32) -> Self {
        Self {
            kind,
            items: Vec::new(),
            width,
            height,
            layout: None,
            phase: DropPhase::Idle,
            ball: None,
            highlight: None,
            load_error: None,
            params: PhysicsParams::default(),
            on_land: None,
        }
    }

    pub fn with_items(kind: BoardKind, items: Vec<String>, width: f32, height: f32) -> Self {
        let mut board = Self::new(kind, width, height);
        board.set_items(items);
        board
    }

    pub fn with_params(mut self, params: PhysicsParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the reward list and rebuild geometry
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.load_error = None;
        self.relayout();
    }

    /// Mark the reward source as failed; the board shows the message and refuses drops
    pub fn set_load_error(&mut self, message: impl Into<String>) {
        self.items.clear();
        self.load_error = Some(message.into());
        self.relayout();
    }

    /// New surface size; geometry is recomputed immediately
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.relayout();
    }

    pub fn set_params(&mut self, params: PhysicsParams) {
        self.params = params;
    }

    fn relayout(&mut self) {
        self.layout = Layout::compute(self.width, self.height, self.items.len());
        if self.layout.is_none() {
            self.highlight = None;
        }
    }

    /// True when a drop request would be accepted
    pub fn can_drop(&self) -> bool {
        self.layout.is_some() && self.phase != DropPhase::Dropping
    }

    /// Launch a ball. Returns false (and changes nothing) if a drop is running
    /// or the board has no items.
    pub fn start_drop<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.phase == DropPhase::Dropping {
            log::debug!("{} board: drop ignored, ball already falling", self.kind.as_str());
            return false;
        }
        let Some(layout) = self.layout.as_ref() else {
            log::debug!("{} board: drop ignored, no rewards loaded", self.kind.as_str());
            return false;
        };

        self.ball = Some(Ball::launch(layout, rng));
        self.highlight = None;
        self.phase = DropPhase::Dropping;
        log::info!("{} board: ball dropped", self.kind.as_str());
        true
    }

    /// Launch a ball and call `on_land` with the decorative slot when it settles
    pub fn drop_ball<R, F>(&mut self, rng: &mut R, on_land: F) -> bool
    where
        R: Rng + ?Sized,
        F: FnOnce(usize) + 'static,
    {
        if !self.start_drop(rng) {
            return false;
        }
        self.on_land = Some(Box::new(on_land));
        true
    }

    /// Advance the in-flight ball by one step.
    ///
    /// Returns the landing slot on the step the ball settles.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.phase != DropPhase::Dropping {
            return None;
        }
        let (Some(ball), Some(layout)) = (self.ball.as_mut(), self.layout.as_ref()) else {
            // Items vanished mid-drop; nothing left to land in
            self.ball = None;
            self.phase = DropPhase::Settled;
            self.on_land = None;
            return None;
        };

        match step_ball(ball, layout, &self.params, rng) {
            StepOutcome::Falling => None,
            StepOutcome::Settled { slot } => {
                log::info!(
                    "{} board: ball settled in slot {} after {} steps",
                    self.kind.as_str(),
                    slot,
                    ball.steps
                );
                self.ball = None;
                self.phase = DropPhase::Settled;
                self.highlight = Some(slot);
                if let Some(callback) = self.on_land.take() {
                    callback(slot);
                }
                Some(slot)
            }
        }
    }

    pub fn kind(&self) -> BoardKind {
        self.kind
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn phase(&self) -> DropPhase {
        self.phase
    }

    pub fn is_dropping(&self) -> bool {
        self.phase == DropPhase::Dropping
    }

    pub fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }
}
