//! Session context shared by the resolver, the AI and the turn controller.
//!
//! [`Game`] is passed explicitly to every component that mutates the board
//! or the ledger; nothing reaches it through global state.

use crate::action::ActionError;
use crate::hex::HexCoord;
use crate::history::History;
use crate::map::Board;
use crate::mapgen::MapGenerator;
use crate::settings::{GameSettings, Rules, SettingsError};
use crate::team::TeamLedger;
use crate::types::{Owner, Slot, TeamId};
use crate::victory::Outcome;
use serde::{Deserialize, Serialize};

/// Round and turn progression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current round (starts at 1).
    pub current_round: u32,
    /// Whose turn it is.
    pub current_turn: Slot,
    /// Has the invasion happened?
    pub is_part2: bool,
    /// Seconds left on the turn clock.
    pub time_left: u32,
    /// Clock ticks are skipped while paused.
    pub paused: bool,
}

impl GameState {
    pub fn new(rules: &Rules) -> Self {
        Self {
            current_round: 1,
            current_turn: Slot::Team(1),
            is_part2: false,
            time_left: rules.turn_seconds_for(1),
            paused: false,
        }
    }
}

/// The complete mutable state of one game.
#[derive(Clone, Debug)]
pub struct Game {
    /// Configuration (immutable after creation).
    pub settings: GameSettings,
    pub board: Board,
    pub teams: TeamLedger,
    pub state: GameState,
    pub history: History,
    /// Tile selected by the acting team.
    pub selection: Option<HexCoord>,
    /// Set once a terminal outcome is reached.
    pub outcome: Option<Outcome>,
}

impl Game {
    /// Build the board and ledger for a new game.
    pub fn new(settings: GameSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let board = MapGenerator::new(settings.map.clone(), settings.team_count).generate()?;
        let teams = TeamLedger::new(settings.team_count, &settings.rules);
        let state = GameState::new(&settings.rules);
        Ok(Self {
            settings,
            board,
            teams,
            state,
            history: History::default(),
            selection: None,
            outcome: None,
        })
    }

    pub fn rules(&self) -> &Rules {
        &self.settings.rules
    }

    /// Highest team id, the last team slot of a round.
    pub fn last_team(&self) -> TeamId {
        self.teams.count()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// The team allowed to act right now.
    pub fn acting_team(&self) -> Result<TeamId, ActionError> {
        if self.is_over() {
            return Err(ActionError::GameOver);
        }
        match self.state.current_turn {
            Slot::Ai => Err(ActionError::AiTurnInProgress),
            Slot::Team(id) => {
                if self.teams.get(id).is_some() {
                    Ok(id)
                } else {
                    Err(ActionError::UnknownTeam(id))
                }
            }
        }
    }

    /// Fail unless `team` can pay `cost`.
    pub fn ensure_ap(&self, team: TeamId, cost: i32) -> Result<(), ActionError> {
        let entry = self.teams.get(team).ok_or(ActionError::UnknownTeam(team))?;
        if !entry.can_afford(cost) {
            return Err(ActionError::InsufficientAp {
                needed: cost,
                available: entry.ap,
            });
        }
        Ok(())
    }

    /// Expansion-complete predicate: the team owns at least one tile and
    /// none of its tiles borders a neutral tile.
    pub fn expansion_complete(&self, team: TeamId) -> bool {
        let owned = self.board.owned_by(Owner::Team(team));
        !owned.is_empty()
            && owned
                .iter()
                .all(|c| !self.board.has_adjacent(c, Owner::Neutral))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_game() -> Game {
        Game::new(GameSettings::skirmish("Test".to_string(), 2, 7)).unwrap()
    }

    #[test]
    fn test_game_creation() {
        let game = create_test_game();
        assert_eq!(game.state.current_round, 1);
        assert_eq!(game.state.current_turn, Slot::Team(1));
        assert_eq!(game.state.time_left, 30);
        assert_eq!(game.last_team(), 2);
        assert!(game.history.is_empty());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = GameSettings::skirmish("Test".to_string(), 9, 0);
        assert!(Game::new(settings).is_err());
    }

    #[test]
    fn test_acting_team() {
        let mut game = create_test_game();
        assert_eq!(game.acting_team(), Ok(1));

        game.state.current_turn = Slot::Ai;
        assert_eq!(game.acting_team(), Err(ActionError::AiTurnInProgress));

        game.state.current_turn = Slot::Team(1);
        game.outcome = Some(Outcome::TeamsWin);
        assert_eq!(game.acting_team(), Err(ActionError::GameOver));
    }

    #[test]
    fn test_ensure_ap() {
        let game = create_test_game();
        assert!(game.ensure_ap(1, 9).is_ok());
        assert_eq!(
            game.ensure_ap(1, 10),
            Err(ActionError::InsufficientAp {
                needed: 10,
                available: 9
            })
        );
    }

    #[test]
    fn test_expansion_complete() {
        let mut game = create_test_game();
        assert!(!game.expansion_complete(1));

        // Wall team 1's HQ in with team 2 tiles.
        let hq = HexCoord::new(0, -6);
        let ring: Vec<HexCoord> = game.board.neighbors(&hq).iter().map(|t| t.coord()).collect();
        for coord in &ring {
            game.board.set_owner(coord, Owner::Team(2));
        }
        assert!(game.expansion_complete(1));

        // A team without tiles never completes.
        for coord in game.board.owned_by(Owner::Team(1)) {
            game.board.set_owner(&coord, Owner::Neutral);
        }
        assert!(!game.expansion_complete(1));
    }
}
