//! Turn controller.
//!
//! Turn order is teams `1..=N` in ascending id, then the AI slot once the
//! invasion has happened, then the next round. Starting a team turn resets
//! the clock, credits income and the one-time expansion bonus, and sweeps
//! the team's tiles (shield expiry and power decay). Every transition after
//! the first is recorded as one composite history entry.

use crate::action::{Action, Compensation, InvasionEvent, TileDelta, TurnChange};
use crate::ai::{self, AiPhase, AiTurn};
use crate::events::SessionEvent;
use crate::map::TileImage;
use crate::session::{Session, Task};
use crate::types::{Owner, Slot, TeamId};
use crate::victory::{self, VictoryStatus};
use tracing::{debug, error, info, warn};

/// What the turn being left hands to the turn being started.
pub(crate) struct Transition {
    pub prev_turn: Slot,
    pub prev_round: u32,
    pub invasion: Option<InvasionEvent>,
    pub ai_effects: Vec<TileImage>,
}

impl Session {
    /// Start the current slot. `transition` is `None` only for the very
    /// first turn and for resumed loads, which record no history.
    pub(crate) fn start_turn(&mut self, transition: Option<Transition>) {
        self.game.state.paused = false;
        match self.game.state.current_turn {
            Slot::Ai => self.start_ai_turn(transition),
            Slot::Team(team) => self.start_team_turn(team, transition),
        }
    }

    fn start_ai_turn(&mut self, transition: Option<Transition>) {
        let round = self.game.state.current_round;
        if let Some(t) = transition {
            self.game.history.push(Action::TurnChange(TurnChange {
                prev_turn: t.prev_turn,
                prev_round: t.prev_round,
                new_turn: Slot::Ai,
                income: 0,
                expansion_bonus: None,
                changes: Vec::new(),
                invasion: t.invasion,
                ai_effects: t.ai_effects,
            }));
        }
        info!(round, "AI turn started");
        self.events.push(SessionEvent::AiTurnStarted { round });
        self.events.push(SessionEvent::StateChanged);
        self.begin_ai_turn();
    }

    fn start_team_turn(&mut self, team: TeamId, transition: Option<Transition>) {
        let Some(expansion_done) = self.game.teams.get(team).map(|t| t.expansion_done) else {
            error!(team, "turn slot points at a team missing from the ledger");
            self.events.push(SessionEvent::diagnostic(format!(
                "team {} is missing, skipping its turn",
                team
            )));
            self.end_turn_now();
            return;
        };

        let rules = self.game.rules().clone();
        let round = self.game.state.current_round;
        self.game.state.time_left = rules.turn_seconds_for(round);

        // Round one plays on the starting endowment.
        let income = if round == 1 {
            0
        } else {
            let stats = self.game.board.stats();
            rules.income(
                stats.tiles(Owner::Team(team)),
                stats.landmarks(Owner::Team(team)),
            )
        };
        self.game.teams.adjust_ap(team, income);

        let expansion_bonus = if !expansion_done && self.game.expansion_complete(team) {
            self.game.teams.adjust_ap(team, rules.expansion_bonus);
            if let Some(t) = self.game.teams.get_mut(team) {
                t.expansion_done = true;
            }
            info!(team, bonus = rules.expansion_bonus, "expansion complete");
            self.events.push(SessionEvent::message(format!(
                "team {} completed its expansion: +{} AP",
                team, rules.expansion_bonus
            )));
            Some(rules.expansion_bonus)
        } else {
            None
        };

        let changes = self.sweep(team);

        if let Some(t) = transition {
            self.game.history.push(Action::TurnChange(TurnChange {
                prev_turn: t.prev_turn,
                prev_round: t.prev_round,
                new_turn: Slot::Team(team),
                income,
                expansion_bonus,
                changes,
                invasion: t.invasion,
                ai_effects: t.ai_effects,
            }));
        }

        self.game.selection = None;
        self.restart_clock();
        self.flush_tiles();
        info!(team, round, income, "turn started");
        self.events.push(SessionEvent::TurnStarted { team, round });
        self.events.push(SessionEvent::StateChanged);
    }

    /// Expire non-permanent shields and decay power (floor 1) on every tile
    /// of the entering team.
    fn sweep(&mut self, team: TeamId) -> Vec<TileDelta> {
        let owned: Vec<TileImage> = self
            .game
            .board
            .all_tiles()
            .iter()
            .filter(|t| t.owner() == Owner::Team(team))
            .map(|t| t.image())
            .collect();

        let mut changes = Vec::new();
        for image in owned {
            let power = (image.power - 1).max(1);
            let expire = image.shielded && !image.permanent_shield;
            if power == image.power && !expire {
                continue;
            }
            if expire {
                self.game.board.set_shielded(&image.coord, false);
            }
            self.game.board.set_power(&image.coord, power);
            changes.push(TileDelta {
                coord: image.coord,
                prev_power: image.power,
                prev_shielded: image.shielded,
            });
        }
        debug!(team, tiles = changes.len(), "turn sweep");
        changes
    }

    /// Leave the current slot and start the next one.
    pub(crate) fn end_turn_now(&mut self) {
        if let Some(handle) = self.clock.take() {
            self.scheduler.cancel(handle);
        }

        let prev_turn = self.game.state.current_turn;
        let prev_round = self.game.state.current_round;
        let ai_effects = if prev_turn.is_ai() {
            std::mem::take(&mut self.ai).effects
        } else {
            Vec::new()
        };

        let last = self.game.last_team();
        self.game.state.current_turn = match prev_turn {
            Slot::Team(id) if id < last => Slot::Team(id + 1),
            Slot::Team(_) if self.game.state.is_part2 => Slot::Ai,
            Slot::Team(_) | Slot::Ai => {
                self.end_round();
                Slot::Team(1)
            }
        };
        self.game.selection = None;
        debug!(from = %prev_turn, to = %self.game.state.current_turn, "turn ended");

        let mut invasion = None;
        if self.game.state.current_round == self.game.rules().invasion_round
            && !self.game.state.is_part2
        {
            invasion = Some(self.trigger_invasion());
        }

        let mut status = victory::evaluate(&self.game);
        if status == VictoryStatus::InvasionOverdue {
            warn!(
                round = self.game.state.current_round,
                "invasion overdue, triggering now"
            );
            invasion = Some(self.trigger_invasion());
            status = victory::evaluate(&self.game);
        }
        if let VictoryStatus::Decided(outcome) = status {
            self.finish(outcome);
            return;
        }

        self.start_turn(Some(Transition {
            prev_turn,
            prev_round,
            invasion,
            ai_effects,
        }));
    }

    fn end_round(&mut self) {
        info!(round = self.game.state.current_round, "round ended");
        self.game.state.current_round += 1;
    }

    /// Hand every landmark to the AI and activate the AI slot.
    pub(crate) fn trigger_invasion(&mut self) -> InvasionEvent {
        self.game.state.is_part2 = true;
        let rules = self.game.rules().clone();
        let landmarks: Vec<TileImage> = self
            .game
            .board
            .all_tiles()
            .iter()
            .filter(|t| t.is_special())
            .map(|t| t.image())
            .collect();

        let mut event = InvasionEvent::default();
        for image in landmarks {
            if let Some(team) = image.owner.team() {
                if self.game.teams.adjust_ap(team, rules.invasion_compensation) {
                    event.compensation.push(Compensation {
                        team,
                        amount: rules.invasion_compensation,
                    });
                }
            }
            let coord = image.coord;
            self.game.board.set_owner(&coord, Owner::Ai);
            self.game.board.set_power(&coord, rules.invasion_power);
            self.game.board.set_permanent_shield(&coord, false);
            self.game.board.set_shielded(&coord, true);
            event.seized.push(image);
        }

        let round = self.game.state.current_round;
        info!(
            round,
            landmarks = event.seized.len(),
            compensated = event.compensation.len(),
            "invasion started"
        );
        self.flush_tiles();
        self.events.push(SessionEvent::InvasionStarted {
            round,
            landmarks: event.seized.len(),
        });
        self.events
            .push(SessionEvent::message("the AI has seized every landmark"));
        if !event.compensation.is_empty() {
            self.events.push(SessionEvent::message(format!(
                "teams that lost a landmark receive {} AP",
                rules.invasion_compensation
            )));
        }
        event
    }

    /// (Re)start the per-second clock for the current team.
    pub(crate) fn restart_clock(&mut self) {
        if let Some(handle) = self.clock.take() {
            self.scheduler.cancel(handle);
        }
        let tick = self.game.rules().clock_tick_ms;
        self.clock = Some(self.scheduler.after(tick, Task::ClockTick));
    }

    pub(crate) fn clock_tick(&mut self) {
        self.clock = None;
        if self.game.is_over() || self.game.state.current_turn.is_ai() {
            return;
        }
        if !self.game.state.paused {
            self.game.state.time_left = self.game.state.time_left.saturating_sub(1);
            self.events.push(SessionEvent::StateChanged);
            if self.game.state.time_left == 0 {
                info!(turn = %self.game.state.current_turn, "turn clock expired");
                self.events
                    .push(SessionEvent::message("time is up, the turn ends"));
                self.end_turn_now();
                return;
            }
        }
        self.restart_clock();
    }

    /// Growth runs immediately; infection is planned after the settle delay.
    pub(crate) fn begin_ai_turn(&mut self) {
        let rules = self.game.rules().clone();
        self.ai = AiTurn {
            phase: AiPhase::Growing,
            ..AiTurn::default()
        };
        let grown = ai::grow(&mut self.game.board, &rules);
        self.ai.effects.extend(grown);
        self.flush_tiles();
        self.scheduler.after(rules.ai_settle_ms, Task::AiBeginInfection);
    }

    pub(crate) fn ai_begin_infection(&mut self) {
        if !self.ai_step_valid(AiPhase::Growing) {
            return;
        }
        let rules = self.game.rules().clone();
        let plan = ai::plan_infection(&self.game.board, &rules, &mut self.rng);
        let duration = plan.duration_ms(&rules);
        for i in 0..plan.pairs.len() {
            self.scheduler
                .after(i as u64 * rules.infection_stagger_ms, Task::AiInfect(i));
        }
        self.scheduler.after(duration, Task::AiSettle);
        self.scheduler
            .after(duration + rules.ai_settle_ms, Task::AiFinish);
        info!(infections = plan.pairs.len(), duration_ms = duration, "AI infecting");
        self.ai.plan = plan;
        self.ai.phase = AiPhase::Infecting;
    }

    pub(crate) fn ai_infect(&mut self, i: usize) {
        if !self.ai_step_valid(AiPhase::Infecting) {
            return;
        }
        let Some(infection) = self.ai.plan.pairs.get(i).copied() else {
            warn!(step = i, "infection step outside the plan");
            return;
        };
        let rules = self.game.rules().clone();
        if let Some(prev) = ai::apply_infection(&mut self.game.board, &rules, &infection) {
            self.ai.effects.push(prev);
        }
        self.flush_tiles();
    }

    pub(crate) fn ai_settle(&mut self) {
        if self.ai_step_valid(AiPhase::Infecting) {
            self.ai.phase = AiPhase::Settling;
        }
    }

    pub(crate) fn ai_finish(&mut self) {
        if !self.ai_step_valid(AiPhase::Settling) {
            return;
        }
        self.ai.phase = AiPhase::Done;
        info!(changed = self.ai.effects.len(), "AI turn complete");
        self.end_turn_now();
    }

    /// Guard for scheduled AI steps. Stale steps are dropped; a step that
    /// arrives out of order forces the AI turn to finish so play continues.
    fn ai_step_valid(&mut self, expected: AiPhase) -> bool {
        if self.game.is_over() || !self.game.state.current_turn.is_ai() {
            debug!(?expected, "stale AI step ignored");
            return false;
        }
        if self.ai.phase == expected {
            return true;
        }
        error!(?expected, actual = ?self.ai.phase, "AI phase out of order");
        self.events.push(SessionEvent::diagnostic(format!(
            "AI turn interrupted in phase {:?}, forcing the next turn",
            self.ai.phase
        )));
        self.scheduler.cancel_all();
        self.ai.phase = AiPhase::Done;
        self.end_turn_now();
        false
    }
}
