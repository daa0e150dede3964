//! Action resolver.
//!
//! One validated-apply operation per player action. Each one checks every
//! precondition before touching anything; a failure returns an
//! [`ActionError`] and leaves board, ledger and history unchanged. On
//! success the board and AP are mutated and exactly one history entry is
//! pushed. This is the only place AP is spent.

use crate::action::{Action, ActionError};
use crate::game::Game;
use crate::hex::HexCoord;
use crate::map::Tile;
use crate::types::{Owner, TeamId};
use tracing::debug;

fn tile<'a>(game: &'a Game, coord: &HexCoord) -> Result<&'a Tile, ActionError> {
    game.board
        .tile_at(coord)
        .ok_or(ActionError::UnknownTile(*coord))
}

fn owned_tile<'a>(game: &'a Game, team: TeamId, coord: &HexCoord) -> Result<&'a Tile, ActionError> {
    let tile = tile(game, coord)?;
    if tile.owner() != Owner::Team(team) {
        return Err(ActionError::NotOwnTile);
    }
    Ok(tile)
}

fn selected(game: &Game) -> Result<HexCoord, ActionError> {
    game.selection.ok_or(ActionError::NoSelection)
}

fn spend(game: &mut Game, team: TeamId, cost: i32) {
    game.teams.adjust_ap(team, -cost);
}

/// Raise the selected tile's power by one.
pub fn recruit(game: &mut Game) -> Result<(), ActionError> {
    let team = game.acting_team()?;
    let coord = selected(game)?;
    let cost = game.rules().recruit_cost;

    let prev_power = owned_tile(game, team, &coord)?.power();
    if prev_power >= game.rules().max_recruit_power {
        return Err(ActionError::MaxPower);
    }
    game.ensure_ap(team, cost)?;

    game.board.set_power(&coord, prev_power + 1);
    spend(game, team, cost);
    game.history.push(Action::Recruit {
        team,
        tile: coord,
        prev_power,
        cost,
    });
    debug!(team, %coord, power = prev_power + 1, "recruit");
    Ok(())
}

/// Shield the selected tile.
pub fn fortify(game: &mut Game) -> Result<(), ActionError> {
    let team = game.acting_team()?;
    let coord = selected(game)?;
    let cost = game.rules().fortify_cost;

    if owned_tile(game, team, &coord)?.is_shielded() {
        return Err(ActionError::AlreadyShielded);
    }
    game.ensure_ap(team, cost)?;

    game.board.set_shielded(&coord, true);
    spend(game, team, cost);
    game.history.push(Action::Fortify {
        team,
        tile: coord,
        prev_shielded: false,
        cost,
    });
    debug!(team, %coord, "fortify");
    Ok(())
}

/// Claim a neutral tile bordering the team's territory.
pub fn expand(game: &mut Game, target: HexCoord) -> Result<(), ActionError> {
    let team = game.acting_team()?;
    let cost = game.rules().expand_cost;

    let prev = tile(game, &target)?.image();
    if !prev.owner.is_neutral() {
        return Err(ActionError::NotNeutral);
    }
    if !game.board.has_adjacent(&target, Owner::Team(team)) {
        return Err(ActionError::NotAdjacent);
    }
    game.ensure_ap(team, cost)?;

    game.board.set_owner(&target, Owner::Team(team));
    game.board.set_power(&target, 1);
    spend(game, team, cost);
    game.history.push(Action::Expand { team, prev, cost });
    debug!(team, %target, "expand");
    Ok(())
}

/// Return an AI tile bordering the team's territory to neutral. Costs the
/// target's current power.
pub fn purify(game: &mut Game, target: HexCoord) -> Result<(), ActionError> {
    let team = game.acting_team()?;

    let prev = tile(game, &target)?.image();
    if !prev.owner.is_ai() {
        return Err(ActionError::NotAiTile);
    }
    if !game.board.has_adjacent(&target, Owner::Team(team)) {
        return Err(ActionError::NotAdjacent);
    }
    let round = game.state.current_round;
    if round == game.rules().invasion_round {
        return Err(ActionError::Invincible { round });
    }
    let cost = prev.power.max(0);
    game.ensure_ap(team, cost)?;

    game.board.set_owner(&target, Owner::Neutral);
    game.board.set_power(&target, 1);
    game.board.set_permanent_shield(&target, false);
    game.board.set_shielded(&target, false);
    spend(game, team, cost);
    if let Some(t) = game.teams.get_mut(team) {
        t.purify_count += 1;
    }
    game.history.push(Action::Purify { team, prev, cost });
    debug!(team, %target, cost, "purify");
    Ok(())
}

/// Attack an adjacent tile from an owned source tile.
///
/// A neutral target needs source power of at least 2 and receives
/// `source - 1`. An enemy target must be weaker than the source and
/// unshielded, and receives `max(1, source - target)`. The source always
/// drops to power 1.
pub fn attack(game: &mut Game, source: HexCoord, target: HexCoord) -> Result<(), ActionError> {
    let team = game.acting_team()?;
    let cost = game.rules().attack_cost;

    let src = owned_tile(game, team, &source)?.image();
    let tgt = tile(game, &target)?.image();

    let distance = game.board.distance(&source, &target);
    if distance != 1 {
        return Err(ActionError::OutOfRange { distance });
    }
    if tgt.owner == Owner::Team(team) {
        return Err(ActionError::OwnTarget);
    }
    let round = game.state.current_round;
    if tgt.owner.is_ai() && round == game.rules().invasion_round {
        return Err(ActionError::Invincible { round });
    }
    game.ensure_ap(team, cost)?;

    let new_power = if tgt.owner.is_neutral() {
        if src.power < 2 {
            return Err(ActionError::TooWeak);
        }
        src.power - 1
    } else {
        if src.power <= tgt.power {
            return Err(ActionError::TooWeak);
        }
        if tgt.shielded {
            return Err(ActionError::TargetShielded);
        }
        (src.power - tgt.power).max(1)
    };

    game.board.set_owner(&target, Owner::Team(team));
    game.board.set_power(&target, new_power);
    game.board.set_power(&source, 1);
    spend(game, team, cost);
    game.history.push(Action::Attack {
        team,
        source: src,
        target: tgt,
        cost,
    });
    debug!(team, %source, %target, power = new_power, "attack");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history;
    use crate::settings::GameSettings;
    use crate::types::Slot;

    const HQ1: HexCoord = HexCoord::new(0, -6);

    fn create_test_game() -> Game {
        Game::new(GameSettings::skirmish("Resolver".to_string(), 2, 3)).unwrap()
    }

    /// Give team 1 an unshielded tile next to its HQ.
    fn claim(game: &mut Game, coord: HexCoord, power: i32) {
        game.board.set_owner(&coord, Owner::Team(1));
        game.board.set_power(&coord, power);
    }

    fn undo(game: &mut Game) {
        let action = game.history.pop().unwrap();
        history::revert(game, action);
    }

    #[test]
    fn test_fortify_scenario() {
        let mut game = create_test_game();
        let coord = HexCoord::new(0, -5);
        claim(&mut game, coord, 3);
        game.teams.get_mut(1).unwrap().ap = 10;
        game.selection = Some(coord);

        fortify(&mut game).unwrap();
        assert!(game.board.tile_at(&coord).unwrap().is_shielded());
        assert_eq!(game.teams.get(1).unwrap().ap, 8);

        assert_eq!(fortify(&mut game), Err(ActionError::AlreadyShielded));
        assert_eq!(game.teams.get(1).unwrap().ap, 8);
        assert_eq!(game.history.len(), 1);

        undo(&mut game);
        assert!(!game.board.tile_at(&coord).unwrap().is_shielded());
        assert_eq!(game.teams.get(1).unwrap().ap, 10);
    }

    #[test]
    fn test_recruit() {
        let mut game = create_test_game();
        assert_eq!(recruit(&mut game), Err(ActionError::NoSelection));

        game.selection = Some(HQ1);
        recruit(&mut game).unwrap();
        assert_eq!(game.board.tile_at(&HQ1).unwrap().power(), 2);
        assert_eq!(game.teams.get(1).unwrap().ap, 8);

        game.board.set_power(&HQ1, 5);
        assert_eq!(recruit(&mut game), Err(ActionError::MaxPower));

        game.selection = Some(HexCoord::new(0, 0));
        assert_eq!(recruit(&mut game), Err(ActionError::NotOwnTile));
        assert_eq!(game.selection, Some(HexCoord::new(0, 0)));
    }

    #[test]
    fn test_recruit_without_ap() {
        let mut game = create_test_game();
        game.teams.get_mut(1).unwrap().ap = 0;
        game.selection = Some(HQ1);
        assert_eq!(
            recruit(&mut game),
            Err(ActionError::InsufficientAp {
                needed: 1,
                available: 0
            })
        );
        assert!(game.history.is_empty());
    }

    #[test]
    fn test_expand() {
        let mut game = create_test_game();
        assert_eq!(
            expand(&mut game, HexCoord::new(0, 0)),
            Err(ActionError::NotAdjacent)
        );
        assert_eq!(expand(&mut game, HQ1), Err(ActionError::NotNeutral));

        let target = HexCoord::new(1, -6);
        expand(&mut game, target).unwrap();
        let tile = game.board.tile_at(&target).unwrap();
        assert_eq!(tile.owner(), Owner::Team(1));
        assert_eq!(tile.power(), 1);
        assert_eq!(game.teams.get(1).unwrap().ap, 6);

        undo(&mut game);
        let tile = game.board.tile_at(&target).unwrap();
        assert!(tile.owner().is_neutral());
        assert_eq!(tile.power(), 0);
        assert_eq!(game.teams.get(1).unwrap().ap, 9);
    }

    #[test]
    fn test_purify_cost_and_effect() {
        let mut game = create_test_game();
        let target = HexCoord::new(1, -6);
        game.board.set_owner(&target, Owner::Ai);
        game.board.set_power(&target, 4);
        game.board.set_shielded(&target, true);
        game.state.current_round = 10;

        purify(&mut game, target).unwrap();
        let tile = game.board.tile_at(&target).unwrap();
        assert_eq!(tile.owner(), Owner::Neutral);
        assert_eq!(tile.power(), 1);
        assert!(!tile.is_shielded());
        assert_eq!(game.teams.get(1).unwrap().ap, 5);
        assert_eq!(game.teams.get(1).unwrap().purify_count, 1);

        undo(&mut game);
        let tile = game.board.tile_at(&target).unwrap();
        assert!(tile.owner().is_ai());
        assert_eq!(tile.power(), 4);
        assert!(tile.is_shielded());
        assert_eq!(game.teams.get(1).unwrap().ap, 9);
        assert_eq!(game.teams.get(1).unwrap().purify_count, 0);
    }

    #[test]
    fn test_purify_rejections() {
        let mut game = create_test_game();
        let target = HexCoord::new(1, -6);
        assert_eq!(purify(&mut game, target), Err(ActionError::NotAiTile));

        game.board.set_owner(&target, Owner::Ai);
        game.board.set_power(&target, 12);
        game.state.current_round = 9;
        assert_eq!(
            purify(&mut game, target),
            Err(ActionError::Invincible { round: 9 })
        );

        game.state.current_round = 10;
        assert_eq!(
            purify(&mut game, target),
            Err(ActionError::InsufficientAp {
                needed: 12,
                available: 9
            })
        );
    }

    #[test]
    fn test_attack_neutral_needs_power() {
        let mut game = create_test_game();
        let target = HexCoord::new(1, -6);
        let before = game.board.tile_at(&target).unwrap().image();

        assert_eq!(attack(&mut game, HQ1, target), Err(ActionError::TooWeak));
        assert_eq!(game.board.tile_at(&target).unwrap().image(), before);
        assert_eq!(game.board.tile_at(&HQ1).unwrap().power(), 1);
        assert_eq!(game.teams.get(1).unwrap().ap, 9);
        assert!(game.history.is_empty());

        game.board.set_power(&HQ1, 4);
        attack(&mut game, HQ1, target).unwrap();
        assert_eq!(game.board.tile_at(&target).unwrap().power(), 3);
        assert_eq!(game.board.tile_at(&target).unwrap().owner(), Owner::Team(1));
        assert_eq!(game.board.tile_at(&HQ1).unwrap().power(), 1);
        assert_eq!(game.teams.get(1).unwrap().ap, 7);
    }

    #[test]
    fn test_attack_enemy() {
        let mut game = create_test_game();
        let source = HexCoord::new(0, -5);
        let target = HexCoord::new(1, -5);
        claim(&mut game, source, 5);
        game.board.set_owner(&target, Owner::Team(2));
        game.board.set_power(&target, 2);
        game.board.set_shielded(&target, true);

        assert_eq!(
            attack(&mut game, source, target),
            Err(ActionError::TargetShielded)
        );
        game.board.set_shielded(&target, false);
        game.board.set_power(&target, 5);
        assert_eq!(attack(&mut game, source, target), Err(ActionError::TooWeak));

        game.board.set_power(&target, 2);
        attack(&mut game, source, target).unwrap();
        assert_eq!(game.board.tile_at(&target).unwrap().power(), 3);
        assert_eq!(game.board.tile_at(&source).unwrap().power(), 1);

        undo(&mut game);
        assert_eq!(game.board.tile_at(&target).unwrap().owner(), Owner::Team(2));
        assert_eq!(game.board.tile_at(&target).unwrap().power(), 2);
        assert_eq!(game.board.tile_at(&source).unwrap().power(), 5);
    }

    #[test]
    fn test_attack_range_and_invincibility() {
        let mut game = create_test_game();
        let source = HexCoord::new(0, -5);
        claim(&mut game, source, 5);
        assert_eq!(
            attack(&mut game, source, HexCoord::new(0, -3)),
            Err(ActionError::OutOfRange { distance: 2 })
        );
        assert_eq!(attack(&mut game, source, HQ1), Err(ActionError::OwnTarget));

        let ai = HexCoord::new(1, -5);
        game.board.set_owner(&ai, Owner::Ai);
        game.board.set_power(&ai, 1);
        game.state.current_round = 9;
        assert_eq!(
            attack(&mut game, source, ai),
            Err(ActionError::Invincible { round: 9 })
        );
        game.state.current_round = 10;
        attack(&mut game, source, ai).unwrap();
        assert_eq!(game.board.tile_at(&ai).unwrap().power(), 4);
    }

    #[test]
    fn test_actions_refused_during_ai_turn() {
        let mut game = create_test_game();
        game.state.current_turn = Slot::Ai;
        game.selection = Some(HQ1);
        assert_eq!(recruit(&mut game), Err(ActionError::AiTurnInProgress));
    }
}
