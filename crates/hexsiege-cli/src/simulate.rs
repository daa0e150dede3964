//! Fast-forward simulation where every team passes its turn.
//!
//! Useful to watch the AI faction on its own: once the invasion lands the
//! AI grows and infects unopposed until it holds the loss share.

use crate::error::CliError;
use crate::output;
use hexsiege_core::{GameSettings, Owner, Session, SessionEvent};
use tracing::info;

pub fn run(settings: GameSettings, max_rounds: u32) -> Result<(), CliError> {
    let mut session = Session::new(settings)?;
    for line in fast_forward(&mut session, max_rounds)? {
        println!("{}", line);
    }

    let game = session.game();
    match session.outcome() {
        Some(outcome) => {
            info!(?outcome, round = game.state.current_round, "simulation finished");
            println!("final: {} (round {})", outcome, game.state.current_round);
        }
        None => println!("no outcome after {} rounds", max_rounds),
    }
    println!("{}", output::board(game));
    session.shutdown();
    Ok(())
}

/// Pass every team turn and let the AI slot run on the scheduler until the
/// game ends or `max_rounds` is over. Returns the report lines: one summary
/// per round plus the invasion, game-over and diagnostic events.
pub fn fast_forward(session: &mut Session, max_rounds: u32) -> Result<Vec<String>, CliError> {
    let step = session.game().rules().clock_tick_ms;
    let mut lines = Vec::new();
    let mut reported = 0;

    while session.outcome().is_none() && session.game().state.current_round <= max_rounds {
        let round = session.game().state.current_round;
        if round != reported {
            lines.push(round_summary(session));
            reported = round;
        }

        if session.game().state.current_turn.is_ai() {
            session.advance(step);
        } else {
            session.end_turn()?;
        }

        for event in session.drain_events() {
            if matches!(
                event,
                SessionEvent::InvasionStarted { .. }
                    | SessionEvent::GameOver { .. }
                    | SessionEvent::Diagnostic { .. }
            ) {
                lines.extend(output::event_line(&event));
            }
        }
    }
    Ok(lines)
}

fn round_summary(session: &Session) -> String {
    let game = session.game();
    let stats = game.board.stats();
    let mut parts: Vec<String> = game
        .teams
        .iter()
        .map(|t| format!("team {}: {}", t.id, stats.tiles(Owner::Team(t.id))))
        .collect();
    parts.push(format!("AI: {}", stats.tiles(Owner::Ai)));
    format!("round {:>2} | {}", game.state.current_round, parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexsiege_core::Outcome;

    fn create_session(seed: u64) -> Session {
        Session::new(GameSettings::skirmish("Simulate".to_string(), 2, seed)).unwrap()
    }

    #[test]
    fn test_passing_teams_lose_to_the_ai() {
        let mut session = create_session(42);
        let lines = fast_forward(&mut session, 30).unwrap();

        assert_eq!(session.outcome(), Some(Outcome::TeamsLose));
        let round = session.game().state.current_round;
        assert!(round > 9 && round <= 30);

        let stats = session.game().board.stats();
        assert!(stats.tiles(Owner::Ai) * 2 >= session.game().board.tile_count());
        assert_eq!(stats.tiles(Owner::Team(1)), 1);
        assert_eq!(stats.tiles(Owner::Team(2)), 1);

        assert_eq!(lines[0], "round  1 | team 1: 1 | team 2: 1 | AI: 0");
        assert!(lines
            .iter()
            .any(|l| l == "!! invasion in round 9: 7 landmarks seized"));
        assert!(lines.last().unwrap().starts_with("GAME OVER"));
        assert!(!lines.iter().any(|l| l.starts_with("[diagnostic]")));
    }

    #[test]
    fn test_round_limit_stops_before_the_invasion() {
        let mut session = create_session(42);
        let lines = fast_forward(&mut session, 3).unwrap();

        assert_eq!(session.outcome(), None);
        assert_eq!(session.game().state.current_round, 4);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("round  3 |"));
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed| {
            let mut session = create_session(seed);
            let lines = fast_forward(&mut session, 30).unwrap();
            (lines, session.save())
        };
        assert_eq!(play(9), play(9));
    }
}
