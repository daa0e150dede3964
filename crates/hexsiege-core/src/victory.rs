//! Victory evaluation.
//!
//! A pure check over the current game, run after every turn transition.

use crate::game::Game;
use crate::types::Owner;
use serde::{Deserialize, Serialize};

/// Terminal result of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The AI was wiped out after the invasion.
    TeamsWin,
    /// The AI holds the loss share of the board.
    TeamsLose,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::TeamsWin => write!(f, "the teams have driven out the AI"),
            Outcome::TeamsLose => write!(f, "the AI has overrun the board"),
        }
    }
}

/// Result of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VictoryStatus {
    Ongoing,
    /// The invasion round has passed without the invasion; the caller must
    /// trigger it now.
    InvasionOverdue,
    Decided(Outcome),
}

pub fn evaluate(game: &Game) -> VictoryStatus {
    let rules = game.rules();
    let round = game.state.current_round;

    if !game.state.is_part2 {
        if round >= rules.invasion_round {
            return VictoryStatus::InvasionOverdue;
        }
        return VictoryStatus::Ongoing;
    }

    let stats = game.board.stats();
    let ai_tiles = stats.tiles(Owner::Ai);
    if rules.is_loss_share(ai_tiles, game.board.tile_count()) {
        return VictoryStatus::Decided(Outcome::TeamsLose);
    }
    if round > rules.invasion_round && ai_tiles == 0 {
        return VictoryStatus::Decided(Outcome::TeamsWin);
    }
    VictoryStatus::Ongoing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameSettings;

    fn create_test_game() -> Game {
        Game::new(GameSettings::skirmish("Victory".to_string(), 2, 0)).unwrap()
    }

    fn give_ai(game: &mut Game, count: usize) {
        let coords: Vec<_> = game
            .board
            .all_tiles()
            .iter()
            .filter(|t| t.owner().is_neutral())
            .take(count)
            .map(|t| t.coord())
            .collect();
        for coord in coords {
            game.board.set_owner(&coord, Owner::Ai);
        }
    }

    #[test]
    fn test_ongoing_before_invasion() {
        let mut game = create_test_game();
        for round in 1..=8 {
            game.state.current_round = round;
            assert_eq!(evaluate(&game), VictoryStatus::Ongoing);
        }
    }

    #[test]
    fn test_invasion_overdue() {
        let mut game = create_test_game();
        game.state.current_round = 9;
        assert_eq!(evaluate(&game), VictoryStatus::InvasionOverdue);
    }

    #[test]
    fn test_win_after_invasion_round() {
        let mut game = create_test_game();
        game.state.is_part2 = true;
        game.state.current_round = 9;
        assert_eq!(evaluate(&game), VictoryStatus::Ongoing);

        game.state.current_round = 10;
        assert_eq!(evaluate(&game), VictoryStatus::Decided(Outcome::TeamsWin));

        give_ai(&mut game, 1);
        assert_eq!(evaluate(&game), VictoryStatus::Ongoing);
    }

    #[test]
    fn test_loss_at_half_share() {
        let mut game = create_test_game();
        game.state.is_part2 = true;
        game.state.current_round = 9;
        // 127 tiles: 63 is below half, 64 reaches it.
        give_ai(&mut game, 63);
        assert_eq!(evaluate(&game), VictoryStatus::Ongoing);
        give_ai(&mut game, 1);
        assert_eq!(evaluate(&game), VictoryStatus::Decided(Outcome::TeamsLose));
    }
}
