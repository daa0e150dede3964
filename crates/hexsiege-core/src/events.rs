//! Outward notifications.
//!
//! The session queues these as it runs; a host drains them after each
//! command or scheduler advance and refreshes its view. The core never
//! reads anything back from the host.

use crate::hex::HexCoord;
use crate::types::TeamId;
use crate::victory::Outcome;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A team's turn began.
    TurnStarted { team: TeamId, round: u32 },
    /// The AI turn began.
    AiTurnStarted { round: u32 },
    /// Landmarks were seized by the AI.
    InvasionStarted { round: u32, landmarks: usize },
    /// A tile changed and should be redrawn.
    TileChanged { coord: HexCoord },
    /// Round, turn, AP or clock changed.
    StateChanged,
    /// User-facing message, including refused commands.
    Message { text: String },
    /// Invariant violation that forced a turn advance.
    Diagnostic { text: String },
    GameOver { outcome: Outcome },
}

impl SessionEvent {
    pub fn message(text: impl Into<String>) -> Self {
        SessionEvent::Message { text: text.into() }
    }

    pub fn diagnostic(text: impl Into<String>) -> Self {
        SessionEvent::Diagnostic { text: text.into() }
    }
}

/// FIFO of pending notifications.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    pending: Vec<SessionEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: SessionEvent) {
        self.pending.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
