//! Team economy state.

use crate::settings::Rules;
use crate::types::{TeamColor, TeamId};
use serde::{Deserialize, Serialize};

/// A team in the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team id (1-6).
    pub id: TeamId,
    /// Color for map display.
    pub color: TeamColor,
    /// Spendable action points. Admin adjustments may drive it negative.
    pub ap: i32,
    /// Successful purifications; only undo decrements it.
    pub purify_count: u32,
    /// Has the one-time expansion bonus been granted?
    pub expansion_done: bool,
}

impl Team {
    /// Create a team with its round-one endowment.
    pub fn new(id: TeamId, starting_ap: i32) -> Self {
        Self {
            id,
            color: TeamColor::default_for_team(id),
            ap: starting_ap,
            purify_count: 0,
            expansion_done: false,
        }
    }

    /// Can the team pay `cost`?
    pub fn can_afford(&self, cost: i32) -> bool {
        self.ap >= cost
    }
}

/// Every configured team, in id order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLedger {
    teams: Vec<Team>,
}

impl TeamLedger {
    /// Create teams `1..=count` with the endowment from `rules`.
    pub fn new(count: u8, rules: &Rules) -> Self {
        let teams = (1..=count)
            .map(|id| Team::new(id, rules.starting_ap_for(id)))
            .collect();
        Self { teams }
    }

    /// Build a ledger from explicit team records (used by snapshot loads).
    pub fn from_teams(mut teams: Vec<Team>) -> Self {
        teams.sort_by_key(|t| t.id);
        Self { teams }
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    /// Number of configured teams. The last team id equals this count.
    pub fn count(&self) -> u8 {
        self.teams.len() as u8
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    /// Add `delta` AP to a team. Returns false if the team is unknown.
    pub fn adjust_ap(&mut self, id: TeamId, delta: i32) -> bool {
        match self.get_mut(id) {
            Some(team) => {
                team.ap += delta;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_endowment() {
        let ledger = TeamLedger::new(6, &Rules::default());
        assert_eq!(ledger.count(), 6);
        let aps: Vec<i32> = ledger.iter().map(|t| t.ap).collect();
        assert_eq!(aps, vec![9, 9, 10, 10, 11, 11]);
        assert_eq!(ledger.get(4).unwrap().color, TeamColor::Blue);
        assert!(ledger.get(7).is_none());
    }

    #[test]
    fn test_adjust_ap() {
        let mut ledger = TeamLedger::new(2, &Rules::default());
        assert!(ledger.adjust_ap(2, -12));
        assert_eq!(ledger.get(2).unwrap().ap, -3);
        assert!(!ledger.get(2).unwrap().can_afford(1));
        assert!(!ledger.adjust_ap(5, 1));
    }

    #[test]
    fn test_from_teams_sorted() {
        let ledger = TeamLedger::from_teams(vec![Team::new(2, 5), Team::new(1, 7)]);
        let ids: Vec<TeamId> = ledger.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
