//! A running game and its command surface.
//!
//! [`Session`] owns the [`Game`] context, the delayed-task scheduler, the
//! AI tie-break RNG and the outgoing event queue. Hosts call the command
//! methods, advance the scheduler by elapsed time and drain events.

use crate::action::{Action, ActionError};
use crate::ai::{AiPhase, AiTurn};
use crate::events::{EventQueue, SessionEvent};
use crate::game::Game;
use crate::hex::HexCoord;
use crate::history;
use crate::resolver;
use crate::scheduler::{Scheduler, TaskHandle};
use crate::settings::{GameSettings, SettingsError};
use crate::snapshot::{Snapshot, SnapshotError};
use crate::types::{Slot, TeamId};
use crate::victory::Outcome;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

/// Deferred work run by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    /// One second of the turn clock.
    ClockTick,
    /// Plan the infection once growth has settled.
    AiBeginInfection,
    /// Apply the n-th planned infection.
    AiInfect(usize),
    /// All infections applied.
    AiSettle,
    /// Hand the turn back.
    AiFinish,
}

/// Errors creating a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
}

pub struct Session {
    pub(crate) game: Game,
    pub(crate) scheduler: Scheduler<Task>,
    pub(crate) rng: StdRng,
    pub(crate) events: EventQueue,
    pub(crate) ai: AiTurn,
    pub(crate) clock: Option<TaskHandle>,
    destroyed: bool,
}

impl Session {
    /// Create a game, place the HQs and start team 1's first turn.
    pub fn new(settings: GameSettings) -> Result<Self, SessionError> {
        let rng = StdRng::seed_from_u64(settings.seed);
        let game = Game::new(settings)?;
        info!(
            name = %game.settings.name,
            teams = game.teams.count(),
            tiles = game.board.tile_count(),
            "session created"
        );
        let mut session = Self {
            game,
            scheduler: Scheduler::new(),
            rng,
            events: EventQueue::default(),
            ai: AiTurn::default(),
            clock: None,
            destroyed: false,
        };
        session.start_turn(None);
        Ok(session)
    }

    /// Read-only view of the game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.game.outcome
    }

    pub fn ai_phase(&self) -> AiPhase {
        self.ai.phase
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Logical time in milliseconds since the session started.
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// Take every pending notification.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    /// Select a tile for recruit, fortify and attack.
    pub fn select(&mut self, coord: HexCoord) -> Result<(), ActionError> {
        self.command("select", |game| {
            game.acting_team()?;
            if !game.board.contains(&coord) {
                return Err(ActionError::UnknownTile(coord));
            }
            game.selection = Some(coord);
            Ok(())
        })
    }

    pub fn recruit(&mut self) -> Result<(), ActionError> {
        self.action("recruit", resolver::recruit)
    }

    pub fn fortify(&mut self) -> Result<(), ActionError> {
        self.action("fortify", resolver::fortify)
    }

    pub fn expand(&mut self, target: HexCoord) -> Result<(), ActionError> {
        self.action("expand", |game| resolver::expand(game, target))
    }

    pub fn purify(&mut self, target: HexCoord) -> Result<(), ActionError> {
        self.action("purify", |game| resolver::purify(game, target))
    }

    pub fn attack(&mut self, source: HexCoord, target: HexCoord) -> Result<(), ActionError> {
        self.action("attack", |game| resolver::attack(game, source, target))
    }

    /// Attack from the selected tile.
    pub fn attack_selected(&mut self, target: HexCoord) -> Result<(), ActionError> {
        self.action("attack", |game| {
            let source = game.selection.ok_or(ActionError::NoSelection)?;
            resolver::attack(game, source, target)
        })
    }

    /// End the acting team's turn.
    pub fn end_turn(&mut self) -> Result<(), ActionError> {
        if self.destroyed {
            return Err(ActionError::SessionClosed);
        }
        if let Err(err) = self.game.acting_team() {
            self.events.push(SessionEvent::message(err.to_string()));
            return Err(err);
        }
        self.end_turn_now();
        Ok(())
    }

    /// Pop the newest history entry and revert it.
    pub fn undo(&mut self) -> Result<(), ActionError> {
        if self.destroyed {
            return Err(ActionError::SessionClosed);
        }
        let result = self.undo_now();
        if let Err(err) = &result {
            self.events.push(SessionEvent::message(err.to_string()));
        }
        result
    }

    /// Add `delta` AP to a team, recorded in history.
    pub fn admin_adjust_ap(&mut self, team: TeamId, delta: i32) -> Result<(), ActionError> {
        self.command("admin AP change", |game| {
            if game.is_over() {
                return Err(ActionError::GameOver);
            }
            if game.state.current_turn.is_ai() {
                return Err(ActionError::AiTurnInProgress);
            }
            if !game.teams.adjust_ap(team, delta) {
                return Err(ActionError::UnknownTeam(team));
            }
            game.history.push(Action::AdminApChange {
                team,
                amount: delta,
            });
            Ok(())
        })?;
        info!(team, delta, "admin AP change");
        self.events
            .push(SessionEvent::message(format!("team {} AP {:+}", team, delta)));
        self.events.push(SessionEvent::StateChanged);
        Ok(())
    }

    /// Freeze or resume the turn clock. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.destroyed {
            return self.game.state.paused;
        }
        self.game.state.paused = !self.game.state.paused;
        info!(paused = self.game.state.paused, "pause toggled");
        self.events.push(SessionEvent::StateChanged);
        self.game.state.paused
    }

    /// Run every task due within the next `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        if self.destroyed {
            return;
        }
        let until = self.scheduler.now() + ms;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
            if self.destroyed {
                return;
            }
        }
        self.scheduler.advance_to(until);
    }

    /// Cancel everything and refuse further commands.
    pub fn shutdown(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduler.cancel_all();
        self.clock = None;
        self.ai = AiTurn::default();
        self.destroyed = true;
        info!("session shut down");
    }

    /// Capture the current state.
    pub fn save(&self) -> Snapshot {
        Snapshot::capture(&self.game)
    }

    /// Replace the current state with a snapshot. On error nothing changes.
    pub fn load(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if self.destroyed {
            warn!("load refused, session is shut down");
            return Err(SnapshotError::SessionClosed);
        }
        if let Err(err) = snapshot.validate(&self.game) {
            warn!(error = %err, "snapshot rejected");
            self.events
                .push(SessionEvent::message(format!("load failed: {}", err)));
            return Err(err);
        }
        self.scheduler.cancel_all();
        self.clock = None;
        self.ai = AiTurn::default();
        snapshot.apply(&mut self.game)?;
        info!(
            round = self.game.state.current_round,
            turn = %self.game.state.current_turn,
            "snapshot loaded"
        );
        self.events.push(SessionEvent::message("game loaded"));
        self.resume_after_load();
        Ok(())
    }

    /// Run a validated player action and report the result outward.
    fn action<F>(&mut self, label: &'static str, apply: F) -> Result<(), ActionError>
    where
        F: FnOnce(&mut Game) -> Result<(), ActionError>,
    {
        self.command(label, apply)?;
        let bonus = self.game.rules().action_time_bonus_secs;
        self.game.state.time_left += bonus;
        self.events.push(SessionEvent::message(format!(
            "{} done, +{}s on the clock",
            label, bonus
        )));
        self.events.push(SessionEvent::StateChanged);
        Ok(())
    }

    fn command<F>(&mut self, label: &'static str, apply: F) -> Result<(), ActionError>
    where
        F: FnOnce(&mut Game) -> Result<(), ActionError>,
    {
        if self.destroyed {
            return Err(ActionError::SessionClosed);
        }
        match apply(&mut self.game) {
            Ok(()) => {
                self.flush_tiles();
                Ok(())
            }
            Err(err) => {
                info!(command = label, reason = %err, "command refused");
                self.events.push(SessionEvent::message(err.to_string()));
                Err(err)
            }
        }
    }

    /// Queue a refresh for every tile changed since the last flush.
    pub(crate) fn flush_tiles(&mut self) {
        for coord in self.game.board.take_dirty() {
            self.events.push(SessionEvent::TileChanged { coord });
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ClockTick => self.clock_tick(),
            Task::AiBeginInfection => self.ai_begin_infection(),
            Task::AiInfect(i) => self.ai_infect(i),
            Task::AiSettle => self.ai_settle(),
            Task::AiFinish => self.ai_finish(),
        }
    }

    fn undo_now(&mut self) -> Result<(), ActionError> {
        if self.game.is_over() {
            return Err(ActionError::GameOver);
        }
        if self.game.state.current_turn.is_ai() {
            return Err(ActionError::AiTurnInProgress);
        }
        let (count, crosses_turn) = match self.game.history.last() {
            None => return Err(ActionError::NothingToUndo),
            Some(Action::TurnChange(change)) if change.leaves_ai() => {
                // The AI turn is undone as a whole, together with the entry
                // that entered it.
                match self.game.history.second_last() {
                    Some(Action::TurnChange(entry)) if entry.enters_ai() => {}
                    _ => return Err(ActionError::AiTurnBoundary),
                }
                (2, true)
            }
            Some(Action::TurnChange(_)) => (1, true),
            Some(_) => (1, false),
        };

        let mut kinds = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(action) = self.game.history.pop() {
                kinds.push(action.kind());
                history::revert(&mut self.game, action);
            }
        }

        if crosses_turn {
            self.game.selection = None;
            self.game.state.paused = false;
            self.restart_clock();
        }
        self.flush_tiles();
        info!(
            undone = ?kinds,
            turn = %self.game.state.current_turn,
            round = self.game.state.current_round,
            "undo"
        );
        self.events
            .push(SessionEvent::message(format!("undid {}", kinds.join(" + "))));
        self.events.push(SessionEvent::StateChanged);
        Ok(())
    }

    /// Continue play in the slot a snapshot was saved in.
    fn resume_after_load(&mut self) {
        self.flush_tiles();
        match self.game.state.current_turn {
            Slot::Ai => self.begin_ai_turn(),
            Slot::Team(team) => {
                let round = self.game.state.current_round;
                self.game.state.time_left = self.game.rules().turn_seconds_for(round);
                self.restart_clock();
                self.events.push(SessionEvent::TurnStarted { team, round });
            }
        }
        self.events.push(SessionEvent::StateChanged);
    }

    /// Stop play with a terminal result.
    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.game.outcome = Some(outcome);
        self.scheduler.cancel_all();
        self.clock = None;
        self.ai = AiTurn::default();
        info!(?outcome, round = self.game.state.current_round, "game over");
        self.flush_tiles();
        self.events.push(SessionEvent::GameOver { outcome });
        self.events.push(SessionEvent::message(outcome.to_string()));
        self.events.push(SessionEvent::StateChanged);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("round", &self.game.state.current_round)
            .field("turn", &self.game.state.current_turn)
            .field("ai_phase", &self.ai.phase)
            .field("pending_tasks", &self.scheduler.pending())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}
