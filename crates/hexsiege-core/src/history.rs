//! Undo stack.
//!
//! A strict LIFO of [`Action`] records. Reverting an entry writes every
//! captured field back verbatim through the board setters, so derived
//! caches stay consistent. There is no redo.

use crate::action::{Action, TurnChange};
use crate::game::Game;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<Action>,
}

impl History {
    pub fn push(&mut self, action: Action) {
        debug!(kind = action.kind(), depth = self.entries.len() + 1, "history push");
        self.entries.push(action);
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.entries.pop()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&Action> {
        self.entries.last()
    }

    /// Entry below the most recent one.
    pub fn second_last(&self) -> Option<&Action> {
        self.entries.len().checked_sub(2).and_then(|i| self.entries.get(i))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Apply the inverse of a popped entry.
pub fn revert(game: &mut Game, action: Action) {
    debug!(kind = action.kind(), "reverting");
    match action {
        Action::Recruit {
            team,
            tile,
            prev_power,
            cost,
        } => {
            game.board.set_power(&tile, prev_power);
            game.teams.adjust_ap(team, cost);
        }
        Action::Fortify {
            team,
            tile,
            prev_shielded,
            cost,
        } => {
            game.board.set_shielded(&tile, prev_shielded);
            game.teams.adjust_ap(team, cost);
        }
        Action::Expand { team, prev, cost } => {
            game.board.restore(&prev);
            game.teams.adjust_ap(team, cost);
        }
        Action::Purify { team, prev, cost } => {
            game.board.restore(&prev);
            game.teams.adjust_ap(team, cost);
            if let Some(t) = game.teams.get_mut(team) {
                t.purify_count = t.purify_count.saturating_sub(1);
            }
        }
        Action::Attack {
            team,
            source,
            target,
            cost,
        } => {
            game.board.restore(&target);
            game.board.restore(&source);
            game.teams.adjust_ap(team, cost);
        }
        Action::TurnChange(change) => revert_turn_change(game, change),
        Action::AdminApChange { team, amount } => {
            game.teams.adjust_ap(team, -amount);
        }
    }
}

/// Undo one turn boundary, newest effects first.
fn revert_turn_change(game: &mut Game, change: TurnChange) {
    game.state.current_turn = change.prev_turn;
    game.state.current_round = change.prev_round;

    if let Some(team) = change.new_turn.team() {
        game.teams.adjust_ap(team, -change.granted_ap());
        if change.expansion_bonus.is_some() {
            if let Some(t) = game.teams.get_mut(team) {
                t.expansion_done = false;
            }
        }
    }

    for delta in change.changes.iter().rev() {
        game.board.set_power(&delta.coord, delta.prev_power);
        game.board.set_shielded(&delta.coord, delta.prev_shielded);
    }

    if let Some(invasion) = &change.invasion {
        for image in invasion.seized.iter().rev() {
            game.board.restore(image);
        }
        for paid in &invasion.compensation {
            game.teams.adjust_ap(paid.team, -paid.amount);
        }
        game.state.is_part2 = false;
    }

    for image in change.ai_effects.iter().rev() {
        game.board.restore(image);
    }

    game.state.time_left = game.rules().turn_seconds_for(game.state.current_round);
}
