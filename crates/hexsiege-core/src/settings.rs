//! Game settings and rule constants.

use crate::mapgen::MapPreset;
use crate::types::{TeamId, MAX_TEAMS};
use serde::{Deserialize, Serialize};

/// Configuration for a game session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Display name for the game.
    pub name: String,
    /// Number of teams (1-6).
    pub team_count: u8,
    /// Seed for the AI tie-break RNG.
    pub seed: u64,
    /// Board layout.
    pub map: MapPreset,
    /// Numeric rules.
    pub rules: Rules,
}

impl GameSettings {
    /// Create default settings for a new game.
    pub fn new(name: String) -> Self {
        Self {
            name,
            team_count: MAX_TEAMS,
            seed: 0,
            map: MapPreset::default(),
            rules: Rules::default(),
        }
    }

    /// Settings for a short game with fewer teams, handy for tests and demos.
    pub fn skirmish(name: String, team_count: u8, seed: u64) -> Self {
        Self {
            team_count,
            seed,
            ..Self::new(name)
        }
    }

    /// Validate settings and return any errors.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.name.is_empty() {
            return Err(SettingsError::EmptyName);
        }
        if self.name.len() > 64 {
            return Err(SettingsError::NameTooLong);
        }
        if self.team_count == 0 {
            return Err(SettingsError::TooFewTeams);
        }
        if self.team_count > MAX_TEAMS {
            return Err(SettingsError::TooManyTeams(self.team_count));
        }
        self.rules.validate()?;
        self.map.validate(self.team_count)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::new("New Game".to_string())
    }
}

/// Every numeric rule of the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub recruit_cost: i32,
    pub fortify_cost: i32,
    pub expand_cost: i32,
    pub attack_cost: i32,
    /// Recruit is refused at or above this power.
    pub max_recruit_power: i32,
    pub base_income: i32,
    /// One extra AP per this many owned tiles.
    pub tiles_per_income_step: i32,
    /// Extra AP per owned landmark.
    pub landmark_income: i32,
    /// One-time bonus once a team has no neutral frontier left.
    pub expansion_bonus: i32,
    /// Round-one AP for teams 1-2, 3-4 and 5-6.
    pub starting_ap: [i32; 3],
    /// Turn length for rounds 1-3, 4-6, 7-9 and later.
    pub turn_seconds: [u32; 4],
    /// Seconds added to the clock after each successful action.
    pub action_time_bonus_secs: u32,
    /// Round of the invasion; AI tiles are invincible during it.
    pub invasion_round: u32,
    pub invasion_power: i32,
    /// AP paid to a team losing a landmark to the invasion.
    pub invasion_compensation: i32,
    pub ai_growth_cap: i32,
    /// Minimum power for an AI tile to infect a neighbour.
    pub ai_infection_threshold: i32,
    pub infection_power: i32,
    pub infection_stagger_ms: u64,
    pub ai_settle_ms: u64,
    /// Teams lose once the AI holds this share of the board.
    pub loss_share_percent: u32,
    pub clock_tick_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            recruit_cost: 1,
            fortify_cost: 2,
            expand_cost: 3,
            attack_cost: 2,
            max_recruit_power: 5,
            base_income: 4,
            tiles_per_income_step: 4,
            landmark_income: 2,
            expansion_bonus: 10,
            starting_ap: [9, 10, 11],
            turn_seconds: [30, 40, 50, 60],
            action_time_bonus_secs: 5,
            invasion_round: 9,
            invasion_power: 3,
            invasion_compensation: 2,
            ai_growth_cap: 5,
            ai_infection_threshold: 4,
            infection_power: 3,
            infection_stagger_ms: 100,
            ai_settle_ms: 500,
            loss_share_percent: 50,
            clock_tick_ms: 1000,
        }
    }
}

impl Rules {
    /// Round-one AP endowment for a team.
    pub fn starting_ap_for(&self, team: TeamId) -> i32 {
        match team {
            1 | 2 => self.starting_ap[0],
            3 | 4 => self.starting_ap[1],
            _ => self.starting_ap[2],
        }
    }

    /// Turn length in seconds for a round.
    pub fn turn_seconds_for(&self, round: u32) -> u32 {
        match round {
            0..=3 => self.turn_seconds[0],
            4..=6 => self.turn_seconds[1],
            7..=9 => self.turn_seconds[2],
            _ => self.turn_seconds[3],
        }
    }

    /// Per-turn income for a team holding `tiles` tiles and `landmarks` landmarks.
    pub fn income(&self, tiles: usize, landmarks: usize) -> i32 {
        let steps = tiles as i32 / self.tiles_per_income_step;
        self.base_income + steps + self.landmark_income * landmarks as i32
    }

    /// Has the AI taken enough of the board for the teams to lose?
    pub fn is_loss_share(&self, ai_tiles: usize, total_tiles: usize) -> bool {
        total_tiles > 0
            && (ai_tiles as u64) * 100 >= (total_tiles as u64) * self.loss_share_percent as u64
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.clock_tick_ms == 0 {
            return Err(SettingsError::ZeroTick);
        }
        if self.tiles_per_income_step <= 0 {
            return Err(SettingsError::InvalidRule("tiles_per_income_step"));
        }
        if self.loss_share_percent == 0 || self.loss_share_percent > 100 {
            return Err(SettingsError::InvalidRule("loss_share_percent"));
        }
        if self.invasion_round == 0 {
            return Err(SettingsError::InvalidRule("invasion_round"));
        }
        let costs = [
            self.recruit_cost,
            self.fortify_cost,
            self.expand_cost,
            self.attack_cost,
        ];
        if costs.iter().any(|&c| c < 0) {
            return Err(SettingsError::InvalidRule("action cost"));
        }
        Ok(())
    }
}

/// Errors from invalid game settings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("game name cannot be empty")]
    EmptyName,
    #[error("game name must be 64 characters or less")]
    NameTooLong,
    #[error("need at least 1 team")]
    TooFewTeams,
    #[error("at most 6 teams allowed, got {0}")]
    TooManyTeams(u8),
    #[error("clock tick must be longer than zero")]
    ZeroTick,
    #[error("invalid rule value: {0}")]
    InvalidRule(&'static str),
    #[error("the board has no tiles")]
    EmptyBoard,
    #[error("no HQ position for team {0}")]
    MissingHq(TeamId),
    #[error("{what} at {coord} lies outside the board")]
    OutsideBoard {
        what: &'static str,
        coord: crate::hex::HexCoord,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.team_count, 6);
        assert_eq!(settings.rules.invasion_round, 9);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_starting_ap_tiers() {
        let rules = Rules::default();
        assert_eq!(rules.starting_ap_for(1), 9);
        assert_eq!(rules.starting_ap_for(2), 9);
        assert_eq!(rules.starting_ap_for(3), 10);
        assert_eq!(rules.starting_ap_for(4), 10);
        assert_eq!(rules.starting_ap_for(5), 11);
        assert_eq!(rules.starting_ap_for(6), 11);
    }

    #[test]
    fn test_turn_seconds_tiers() {
        let rules = Rules::default();
        assert_eq!(rules.turn_seconds_for(1), 30);
        assert_eq!(rules.turn_seconds_for(3), 30);
        assert_eq!(rules.turn_seconds_for(4), 40);
        assert_eq!(rules.turn_seconds_for(9), 50);
        assert_eq!(rules.turn_seconds_for(10), 60);
    }

    #[test]
    fn test_income() {
        let rules = Rules::default();
        assert_eq!(rules.income(1, 0), 4);
        assert_eq!(rules.income(7, 0), 5);
        assert_eq!(rules.income(8, 2), 10);
    }

    #[test]
    fn test_loss_share() {
        let rules = Rules::default();
        assert!(!rules.is_loss_share(63, 127));
        assert!(rules.is_loss_share(64, 127));
        assert!(rules.is_loss_share(5, 10));
        assert!(!rules.is_loss_share(0, 0));
    }

    #[test]
    fn test_validation_errors() {
        let mut settings = GameSettings::new(String::new());
        assert_eq!(settings.validate(), Err(SettingsError::EmptyName));

        settings.name = "Siege".to_string();
        settings.team_count = 7;
        assert_eq!(settings.validate(), Err(SettingsError::TooManyTeams(7)));

        settings.team_count = 0;
        assert_eq!(settings.validate(), Err(SettingsError::TooFewTeams));

        settings.team_count = 2;
        settings.rules.clock_tick_ms = 0;
        assert_eq!(settings.validate(), Err(SettingsError::ZeroTick));
    }

    #[test]
    fn test_settings_json_defaults() {
        let settings: GameSettings =
            serde_json::from_str(r#"{"name":"Quick","team_count":2,"rules":{"ai_growth_cap":6}}"#)
                .unwrap();
        assert_eq!(settings.team_count, 2);
        assert_eq!(settings.rules.ai_growth_cap, 6);
        assert_eq!(settings.rules.infection_stagger_ms, 100);
    }
}
