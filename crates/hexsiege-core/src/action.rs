//! Undo records and action failures.
//!
//! Every applied action or turn transition is stored as one [`Action`]
//! carrying exactly the prior values needed to invert it. Records are
//! created when an action has been validated and applied, and dropped the
//! moment they are undone.

use crate::hex::HexCoord;
use crate::map::TileImage;
use crate::types::{Slot, TeamId};
use serde::{Deserialize, Serialize};

/// Prior power and shield of a tile touched by a turn-start sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDelta {
    pub coord: HexCoord,
    pub prev_power: i32,
    pub prev_shielded: bool,
}

/// AP paid to a team whose landmark was seized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compensation {
    pub team: TeamId,
    pub amount: i32,
}

/// Landmark seizure performed by the invasion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvasionEvent {
    /// Landmark pre-images, in index order.
    pub seized: Vec<TileImage>,
    pub compensation: Vec<Compensation>,
}

/// Composite record of one turn boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnChange {
    pub prev_turn: Slot,
    pub prev_round: u32,
    /// Slot that started with this transition.
    pub new_turn: Slot,
    /// Income credited to the starting team.
    pub income: i32,
    /// Expansion bonus credited this transition, if any.
    pub expansion_bonus: Option<i32>,
    /// Decay and shield-expiry sweep.
    pub changes: Vec<TileDelta>,
    pub invasion: Option<InvasionEvent>,
    /// Growth and infection pre-images of the AI turn being left, in the
    /// order they were applied.
    pub ai_effects: Vec<TileImage>,
}

impl TurnChange {
    /// AP granted to the starting team by this transition.
    pub fn granted_ap(&self) -> i32 {
        self.income + self.expansion_bonus.unwrap_or(0)
    }

    /// Does this transition leave the AI slot?
    pub fn leaves_ai(&self) -> bool {
        self.prev_turn.is_ai()
    }

    /// Does this transition enter the AI slot?
    pub fn enters_ai(&self) -> bool {
        self.new_turn.is_ai()
    }
}

/// One undoable history entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Recruit {
        team: TeamId,
        tile: HexCoord,
        prev_power: i32,
        cost: i32,
    },
    Fortify {
        team: TeamId,
        tile: HexCoord,
        prev_shielded: bool,
        cost: i32,
    },
    Expand {
        team: TeamId,
        prev: TileImage,
        cost: i32,
    },
    Purify {
        team: TeamId,
        prev: TileImage,
        cost: i32,
    },
    Attack {
        team: TeamId,
        source: TileImage,
        target: TileImage,
        cost: i32,
    },
    TurnChange(TurnChange),
    AdminApChange {
        team: TeamId,
        amount: i32,
    },
}

impl Action {
    /// Short label used in logs and messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Recruit { .. } => "recruit",
            Action::Fortify { .. } => "fortify",
            Action::Expand { .. } => "expand",
            Action::Purify { .. } => "purify",
            Action::Attack { .. } => "attack",
            Action::TurnChange(_) => "turn change",
            Action::AdminApChange { .. } => "admin AP change",
        }
    }

    /// AP refunded when this entry is undone. Zero for records that carry
    /// explicit deltas instead.
    pub fn cost(&self) -> i32 {
        match self {
            Action::Recruit { cost, .. }
            | Action::Fortify { cost, .. }
            | Action::Expand { cost, .. }
            | Action::Purify { cost, .. }
            | Action::Attack { cost, .. } => *cost,
            Action::TurnChange(_) | Action::AdminApChange { .. } => 0,
        }
    }
}

/// Why a command was refused. State is untouched whenever one is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no tile selected")]
    NoSelection,
    #[error("that tile is not yours")]
    NotOwnTile,
    #[error("not enough AP: need {needed}, have {available}")]
    InsufficientAp { needed: i32, available: i32 },
    #[error("tile is already at maximum power")]
    MaxPower,
    #[error("tile is already shielded")]
    AlreadyShielded,
    #[error("tile is not neutral")]
    NotNeutral,
    #[error("tile is not held by the AI")]
    NotAiTile,
    #[error("tile is not adjacent to your territory")]
    NotAdjacent,
    #[error("target is {distance} steps away, attacks reach 1")]
    OutOfRange { distance: u32 },
    #[error("AI tiles are invincible during round {round}")]
    Invincible { round: u32 },
    #[error("cannot attack your own tile")]
    OwnTarget,
    #[error("source tile is too weak")]
    TooWeak,
    #[error("target is shielded")]
    TargetShielded,
    #[error("no tile at {0}")]
    UnknownTile(HexCoord),
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    #[error("the AI is taking its turn")]
    AiTurnInProgress,
    #[error("the game is over")]
    GameOver,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("cannot undo past the start of the AI turn")]
    AiTurnBoundary,
    #[error("the session has been shut down")]
    SessionClosed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Owner;

    fn turn_change(prev: Slot, new: Slot) -> TurnChange {
        TurnChange {
            prev_turn: prev,
            prev_round: 3,
            new_turn: new,
            income: 5,
            expansion_bonus: Some(10),
            changes: vec![],
            invasion: None,
            ai_effects: vec![],
        }
    }

    #[test]
    fn test_turn_change_granted_ap() {
        let change = turn_change(Slot::Team(1), Slot::Team(2));
        assert_eq!(change.granted_ap(), 15);
        assert!(!change.leaves_ai());
        assert!(turn_change(Slot::Ai, Slot::Team(1)).leaves_ai());
        assert!(turn_change(Slot::Team(2), Slot::Ai).enters_ai());
    }

    #[test]
    fn test_action_cost() {
        let fortify = Action::Fortify {
            team: 1,
            tile: HexCoord::new(0, 0),
            prev_shielded: false,
            cost: 2,
        };
        assert_eq!(fortify.cost(), 2);
        assert_eq!(fortify.kind(), "fortify");
        assert_eq!(Action::AdminApChange { team: 1, amount: 4 }.cost(), 0);
    }

    #[test]
    fn test_action_tagged_json() {
        let action = Action::Expand {
            team: 2,
            prev: TileImage {
                coord: HexCoord::new(1, 1),
                owner: Owner::Neutral,
                power: 0,
                shielded: false,
                permanent_shield: false,
            },
            cost: 3,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "EXPAND");
        assert_eq!(json["prev"]["owner"], 0);
    }

    #[test]
    fn test_error_messages() {
        let err = ActionError::InsufficientAp {
            needed: 3,
            available: 1,
        };
        assert_eq!(err.to_string(), "not enough AP: need 3, have 1");
        assert_eq!(
            ActionError::Invincible { round: 9 }.to_string(),
            "AI tiles are invincible during round 9"
        );
    }
}
