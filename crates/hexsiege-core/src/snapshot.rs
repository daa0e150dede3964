//! Save and load snapshots.
//!
//! A snapshot holds the board, ledger and round state, but no undo history.
//! Loading validates the whole payload against the live board before the
//! first write, then reapplies every tile field through the board setters.
//! Tile indices are checked, never regenerated.

use crate::game::Game;
use crate::hex::HexCoord;
use crate::team::{Team, TeamLedger};
use crate::types::{Owner, Slot, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Persisted state of one tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub q: i32,
    pub r: i32,
    pub index: usize,
    pub owner_id: Owner,
    pub power: i32,
    pub is_shielded: bool,
    pub is_permanent_shield: bool,
    pub is_special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_name: Option<String>,
}

impl TileRecord {
    pub fn coord(&self) -> HexCoord {
        HexCoord::new(self.q, self.r)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub map_id: String,
    pub current_round: u32,
    pub current_turn: Slot,
    pub is_part2: bool,
    pub teams: Vec<Team>,
    pub tiles: Vec<TileRecord>,
}

/// Why a snapshot was rejected. The live game is untouched when one is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the session has been shut down")]
    SessionClosed,
    #[error("snapshot is for map {found}, this game uses map {expected}")]
    MapMismatch { expected: String, found: String },
    #[error("snapshot has {found} tiles, the board has {expected}")]
    TileCount { expected: usize, found: usize },
    #[error("no tile at {0} on this board")]
    UnknownTile(HexCoord),
    #[error("tile {0} appears twice")]
    DuplicateTile(HexCoord),
    #[error("tile {coord} has index {found}, expected {expected}")]
    IndexMismatch {
        coord: HexCoord,
        expected: usize,
        found: usize,
    },
    #[error("tile {0} has a permanent shield but no shield")]
    ShieldInvariant(HexCoord),
    #[error("snapshot has {found} teams, the game has {expected}")]
    TeamCount { expected: u8, found: usize },
    #[error("team {0} is not part of this game")]
    UnknownTeam(TeamId),
    #[error("round must be at least 1")]
    InvalidRound,
    #[error("turn slot {0} is not valid here")]
    InvalidTurn(Slot),
}

impl Snapshot {
    /// Capture the current game.
    pub fn capture(game: &Game) -> Self {
        let tiles = game
            .board
            .all_tiles()
            .iter()
            .map(|t| TileRecord {
                q: t.coord().q,
                r: t.coord().r,
                index: t.index(),
                owner_id: t.owner(),
                power: t.power(),
                is_shielded: t.is_shielded(),
                is_permanent_shield: t.is_permanent_shield(),
                is_special: t.is_special(),
                special_name: t.special_name().map(str::to_string),
            })
            .collect();
        Self {
            map_id: game.settings.map.map_id(),
            current_round: game.state.current_round,
            current_turn: game.state.current_turn,
            is_part2: game.state.is_part2,
            teams: game.teams.iter().cloned().collect(),
            tiles,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the snapshot fits `game` without changing anything.
    pub fn validate(&self, game: &Game) -> Result<(), SnapshotError> {
        let expected_map = game.settings.map.map_id();
        if self.map_id != expected_map {
            return Err(SnapshotError::MapMismatch {
                expected: expected_map,
                found: self.map_id.clone(),
            });
        }

        let team_count = game.teams.count();
        if self.teams.len() != team_count as usize {
            return Err(SnapshotError::TeamCount {
                expected: team_count,
                found: self.teams.len(),
            });
        }
        let mut seen_teams = HashSet::new();
        for team in &self.teams {
            if team.id == 0 || team.id > team_count || !seen_teams.insert(team.id) {
                return Err(SnapshotError::UnknownTeam(team.id));
            }
        }

        if self.current_round == 0 {
            return Err(SnapshotError::InvalidRound);
        }
        match self.current_turn {
            Slot::Team(id) if id > team_count => {
                return Err(SnapshotError::InvalidTurn(self.current_turn))
            }
            Slot::Ai if !self.is_part2 => return Err(SnapshotError::InvalidTurn(Slot::Ai)),
            _ => {}
        }

        if self.tiles.len() != game.board.tile_count() {
            return Err(SnapshotError::TileCount {
                expected: game.board.tile_count(),
                found: self.tiles.len(),
            });
        }
        let mut seen_tiles = HashSet::new();
        for record in &self.tiles {
            let coord = record.coord();
            let tile = game
                .board
                .tile_at(&coord)
                .ok_or(SnapshotError::UnknownTile(coord))?;
            if !seen_tiles.insert(coord) {
                return Err(SnapshotError::DuplicateTile(coord));
            }
            if tile.index() != record.index {
                return Err(SnapshotError::IndexMismatch {
                    coord,
                    expected: tile.index(),
                    found: record.index,
                });
            }
            if let Owner::Team(id) = record.owner_id {
                if id > team_count {
                    return Err(SnapshotError::UnknownTeam(id));
                }
            }
            if record.is_permanent_shield && !record.is_shielded {
                return Err(SnapshotError::ShieldInvariant(coord));
            }
        }
        Ok(())
    }

    /// Validate, then overwrite board, ledger and round state. History and
    /// selection are cleared; scheduling is the caller's concern.
    pub fn apply(&self, game: &mut Game) -> Result<(), SnapshotError> {
        self.validate(game)?;

        for record in &self.tiles {
            let coord = record.coord();
            let name = if record.is_special {
                Some(record.special_name.clone().unwrap_or_default())
            } else {
                None
            };
            game.board.set_owner(&coord, record.owner_id);
            game.board.set_power(&coord, record.power);
            game.board.set_permanent_shield(&coord, record.is_permanent_shield);
            game.board.set_shielded(&coord, record.is_shielded);
            game.board.set_special(&coord, name);
        }

        game.teams = TeamLedger::from_teams(self.teams.clone());
        game.state.current_round = self.current_round;
        game.state.current_turn = self.current_turn;
        game.state.is_part2 = self.is_part2;
        game.state.paused = false;
        game.history.clear();
        game.selection = None;
        game.outcome = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameSettings;

    fn create_test_game() -> Game {
        Game::new(GameSettings::skirmish("Snapshot".to_string(), 3, 0)).unwrap()
    }

    #[test]
    fn test_capture_and_apply() {
        let mut source = create_test_game();
        let coord = HexCoord::new(1, -6);
        source.board.set_owner(&coord, Owner::Team(1));
        source.board.set_power(&coord, 4);
        source.board.set_shielded(&coord, true);
        source.teams.get_mut(2).unwrap().ap = 17;
        source.state.current_round = 4;
        source.state.current_turn = Slot::Team(3);
        let snapshot = Snapshot::capture(&source);

        let json = snapshot.to_json().unwrap();
        let decoded = Snapshot::from_json(&json).unwrap();
        assert_eq!(decoded, snapshot);

        let mut target = create_test_game();
        target.history.push(crate::action::Action::AdminApChange { team: 1, amount: 1 });
        decoded.apply(&mut target).unwrap();

        let tile = target.board.tile_at(&coord).unwrap();
        assert_eq!(tile.owner(), Owner::Team(1));
        assert_eq!(tile.power(), 4);
        assert!(tile.is_shielded());
        assert_eq!(target.teams.get(2).unwrap().ap, 17);
        assert_eq!(target.state.current_round, 4);
        assert_eq!(target.state.current_turn, Slot::Team(3));
        assert!(target.history.is_empty());
        assert_eq!(target.board.stats().tiles(Owner::Team(1)), 2);
    }

    #[test]
    fn test_index_mismatch_leaves_game_untouched() {
        let mut game = create_test_game();
        let mut snapshot = Snapshot::capture(&game);
        snapshot.current_round = 7;
        snapshot.tiles[0].owner_id = Owner::Ai;
        let last = snapshot.tiles.len() - 1;
        snapshot.tiles[last].index = 0;

        let err = snapshot.apply(&mut game).unwrap_err();
        assert!(matches!(err, SnapshotError::IndexMismatch { .. }));
        assert_eq!(game.state.current_round, 1);
        assert!(game.board.all_tiles()[0].owner().is_neutral());
    }

    #[test]
    fn test_rejects_unknown_coordinate() {
        let game = create_test_game();
        let mut snapshot = Snapshot::capture(&game);
        snapshot.tiles[0].q = 40;
        assert!(matches!(
            snapshot.validate(&game),
            Err(SnapshotError::UnknownTile(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_turn_and_team() {
        let game = create_test_game();
        let mut snapshot = Snapshot::capture(&game);
        snapshot.current_turn = Slot::Ai;
        assert!(matches!(
            snapshot.validate(&game),
            Err(SnapshotError::InvalidTurn(Slot::Ai))
        ));

        let mut snapshot = Snapshot::capture(&game);
        snapshot.tiles[3].owner_id = Owner::Team(5);
        assert!(matches!(
            snapshot.validate(&game),
            Err(SnapshotError::UnknownTeam(5))
        ));

        let mut snapshot = Snapshot::capture(&game);
        snapshot.teams.pop();
        assert!(matches!(
            snapshot.validate(&game),
            Err(SnapshotError::TeamCount { .. })
        ));
    }

    #[test]
    fn test_custom_id_does_not_match_hexagon_radius() {
        let game = create_test_game();
        let snapshot = Snapshot::capture(&game);
        assert_eq!(snapshot.map_id, "hexagon:6");

        let layout = crate::mapgen::CustomLayout {
            id: 6,
            tiles: vec![HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(2, 0)],
            hqs: vec![HexCoord::new(0, 0)],
            landmarks: vec![],
        };
        let mut settings = GameSettings::skirmish("Custom".to_string(), 1, 0);
        settings.map = crate::mapgen::MapPreset::Custom(layout);
        let custom = Game::new(settings).unwrap();

        match snapshot.validate(&custom) {
            Err(SnapshotError::MapMismatch { expected, found }) => {
                assert_eq!(expected, "custom:6");
                assert_eq!(found, "hexagon:6");
            }
            other => panic!("expected a map mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Snapshot::from_json("{\"map_id\": 6"),
            Err(SnapshotError::Json(_))
        ));
        // Owner 7 is not a valid id.
        let game = create_test_game();
        let mut value = serde_json::to_value(Snapshot::capture(&game)).unwrap();
        value["tiles"][0]["owner_id"] = serde_json::json!(7);
        assert!(Snapshot::from_json(&value.to_string()).is_err());
    }
}
