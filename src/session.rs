//! Drop session: both boards, the shared RNG and the reveal sequence
//!
//! A drop draws its reward index first, then launches the ball. When the ball
//! settles, its slot is only used for the highlight and the pre-drawn reward
//! goes into history; after a short delay the reward is revealed.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::REVEAL_DELAY_TICKS;
use crate::history::History;
use crate::reward::select_reward;
use crate::settings::Settings;
use crate::sim::{Board, BoardKind};

/// An accepted drop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTicket {
    pub kind: BoardKind,
    /// Winning reward, fixed before the ball moves
    pub reward_index: usize,
}

/// A finished drop, ready for the result popup
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub kind: BoardKind,
    pub reward_index: usize,
    pub reward: String,
    /// Where the ball visually stopped; not related to `reward`
    pub landed_slot: usize,
    /// Unix timestamp (ms) of the reveal
    pub timestamp: f64,
}

impl DropOutcome {
    pub fn result_label(&self) -> &'static str {
        self.kind.result_label()
    }

    /// Whether the host should launch confetti
    pub fn celebrates(&self) -> bool {
        self.kind.celebrates()
    }
}

/// Notifications produced by `Session::tick`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Ball reached the slot band
    BallLanded { kind: BoardKind, slot: usize },
    /// Reveal delay elapsed; show the reward
    RewardRevealed(DropOutcome),
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrop {
    ticket: DropTicket,
    landed_slot: Option<usize>,
    /// Clock reading (ms) when the ball landed
    landed_at: f64,
    reveal_ticks: u32,
}

/// Both reward boards plus history, driven one tick per frame
#[derive(Debug)]
pub struct Session {
    boards: [Board; 2],
    history: History,
    rng: Pcg32,
    active: Option<ActiveDrop>,
}

impl Session {
    /// Create a session whose boards share one seeded random source
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        Self {
            boards: [
                Board::new(BoardKind::Big, width, height),
                Board::new(BoardKind::Small, width, height),
            ],
            history: History::new(),
            rng: Pcg32::seed_from_u64(seed),
            active: None,
        }
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn board(&self, kind: BoardKind) -> &Board {
        &self.boards[kind.index()]
    }

    pub fn board_mut(&mut self, kind: BoardKind) -> &mut Board {
        &mut self.boards[kind.index()]
    }

    pub fn set_rewards(&mut self, kind: BoardKind, items: Vec<String>) {
        self.board_mut(kind).set_items(items);
    }

    pub fn set_load_error(&mut self, kind: BoardKind, message: impl Into<String>) {
        let message = message.into();
        log::error!("{} board unavailable: {}", kind.as_str(), message);
        self.board_mut(kind).set_load_error(message);
    }

    /// Push physics tuning from settings to every board
    pub fn apply_settings(&mut self, settings: &Settings) {
        let params = settings.physics();
        for board in &mut self.boards {
            board.set_params(params);
        }
    }

    /// Resize every board; geometry is rebuilt before the next draw
    pub fn resize(&mut self, width: f32, height: f32) {
        for board in &mut self.boards {
            board.resize(width, height);
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// A drop is falling or waiting for its reveal
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Whether the drop control for `kind` should be enabled
    pub fn can_drop(&self, kind: BoardKind) -> bool {
        !self.is_busy() && self.board(kind).can_drop()
    }

    /// Draw the reward and launch the ball on `kind`.
    ///
    /// Returns `None` without touching any state when the session is busy or
    /// the board has no rewards.
    pub fn request_drop(&mut self, kind: BoardKind) -> Option<DropTicket> {
        if !self.can_drop(kind) {
            log::debug!("Drop on {} board rejected", kind.as_str());
            return None;
        }

        let board = &mut self.boards[kind.index()];
        // Reward first: it must not depend on anything the ball does
        let reward_index = select_reward(&mut self.rng, board.items().len())?;
        if !board.start_drop(&mut self.rng) {
            return None;
        }

        let ticket = DropTicket { kind, reward_index };
        self.active = Some(ActiveDrop {
            ticket,
            landed_slot: None,
            landed_at: 0.0,
            reveal_ticks: 0,
        });
        Some(ticket)
    }

    /// Advance the active drop by one frame
    pub fn tick(&mut self, now_ms: f64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let Some(mut active) = self.active else {
            return events;
        };
        let kind = active.ticket.kind;

        match active.landed_slot {
            None => {
                let board = &mut self.boards[kind.index()];
                if let Some(slot) = board.tick(&mut self.rng) {
                    active.landed_slot = Some(slot);
                    active.landed_at = now_ms;
                    active.reveal_ticks = REVEAL_DELAY_TICKS;
                    events.push(SessionEvent::BallLanded { kind, slot });
                    // History is written on landing; the reveal only shows it
                    if let Some(reward) = board.items().get(active.ticket.reward_index) {
                        self.history.push(kind, reward.clone(), now_ms);
                    }
                } else if !board.is_dropping() {
                    // Board lost its items mid-drop; nothing to reveal
                    log::warn!("{} drop ended without landing", kind.as_str());
                    self.active = None;
                    return events;
                }
                self.active = Some(active);
            }
            Some(slot) => {
                active.reveal_ticks = active.reveal_ticks.saturating_sub(1);
                if active.reveal_ticks > 0 {
                    self.active = Some(active);
                    return events;
                }
                self.active = None;

                let index = active.ticket.reward_index;
                let Some(reward) = self.board(kind).items().get(index).cloned() else {
                    log::warn!("Reward {} vanished from {} board", index, kind.as_str());
                    return events;
                };
                log::info!("{} board reward revealed: {}", kind.as_str(), reward);
                events.push(SessionEvent::RewardRevealed(DropOutcome {
                    kind,
                    reward_index: index,
                    reward,
                    landed_slot: slot,
                    timestamp: active.landed_at,
                }));
            }
        }

        events
    }
}
