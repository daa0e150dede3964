//! Core identifiers used throughout the crate.

use serde::{Deserialize, Serialize};

/// Team identifier (1-6).
pub type TeamId = u8;

/// Highest team id a session can be configured with.
pub const MAX_TEAMS: u8 = 6;

/// Wire value of a neutral owner.
pub const NEUTRAL_ID: u8 = 0;

/// Wire value of the AI faction, both as tile owner and as turn slot.
pub const AI_ID: u8 = 9;

/// Who owns a tile.
///
/// Serialized as the plain integer used by save files: `0` neutral,
/// `1..=6` a team, `9` the AI faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Owner {
    #[default]
    Neutral,
    Team(TeamId),
    Ai,
}

impl Owner {
    /// Is this tile unclaimed?
    pub const fn is_neutral(&self) -> bool {
        matches!(self, Owner::Neutral)
    }

    /// Is this tile held by the AI faction?
    pub const fn is_ai(&self) -> bool {
        matches!(self, Owner::Ai)
    }

    /// The owning team, if a team owns it.
    pub const fn team(&self) -> Option<TeamId> {
        match self {
            Owner::Team(id) => Some(*id),
            _ => None,
        }
    }

    /// Integer form used on the wire.
    pub const fn id(&self) -> u8 {
        match self {
            Owner::Neutral => NEUTRAL_ID,
            Owner::Team(id) => *id,
            Owner::Ai => AI_ID,
        }
    }
}

impl From<Owner> for u8 {
    fn from(owner: Owner) -> Self {
        owner.id()
    }
}

impl TryFrom<u8> for Owner {
    type Error = InvalidId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            NEUTRAL_ID => Ok(Owner::Neutral),
            AI_ID => Ok(Owner::Ai),
            1..=MAX_TEAMS => Ok(Owner::Team(value)),
            other => Err(InvalidId(other)),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Neutral => write!(f, "neutral"),
            Owner::Team(id) => write!(f, "team {}", id),
            Owner::Ai => write!(f, "AI"),
        }
    }
}

/// Whose turn it is.
///
/// Serialized as `1..=6` for team slots and `9` for the AI slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Slot {
    Team(TeamId),
    Ai,
}

impl Slot {
    /// The team whose turn it is, `None` during the AI turn.
    pub const fn team(&self) -> Option<TeamId> {
        match self {
            Slot::Team(id) => Some(*id),
            Slot::Ai => None,
        }
    }

    /// Is this the AI faction's slot?
    pub const fn is_ai(&self) -> bool {
        matches!(self, Slot::Ai)
    }

    /// Integer form used on the wire.
    pub const fn id(&self) -> u8 {
        match self {
            Slot::Team(id) => *id,
            Slot::Ai => AI_ID,
        }
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot::Team(1)
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.id()
    }
}

impl TryFrom<u8> for Slot {
    type Error = InvalidId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            AI_ID => Ok(Slot::Ai),
            1..=MAX_TEAMS => Ok(Slot::Team(value)),
            other => Err(InvalidId(other)),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Team(id) => write!(f, "team {}", id),
            Slot::Ai => write!(f, "AI"),
        }
    }
}

/// An owner or slot id outside `0`, `1..=6`, `9`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid owner or turn id {0}")]
pub struct InvalidId(pub u8);

/// Display color of a team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamColor {
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Brown,
}

impl TeamColor {
    /// Default color for teams 1-6.
    pub const fn default_for_team(team_id: TeamId) -> Self {
        match team_id {
            1 => TeamColor::Orange,
            2 => TeamColor::Yellow,
            3 => TeamColor::Green,
            4 => TeamColor::Blue,
            5 => TeamColor::Purple,
            _ => TeamColor::Brown,
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TeamColor::Orange => "Orange",
            TeamColor::Yellow => "Yellow",
            TeamColor::Green => "Green",
            TeamColor::Blue => "Blue",
            TeamColor::Purple => "Purple",
            TeamColor::Brown => "Brown",
        };
        write!(f, "{}", name)
    }
}
