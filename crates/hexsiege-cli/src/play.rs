//! Interactive play: stdin commands plus a real-time scheduler drive.

use crate::commands::{self, Command};
use crate::error::CliError;
use crate::output;
use hexsiege_core::{GameSettings, Session, Snapshot};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

pub async fn run(settings: GameSettings, tick_ms: u64) -> Result<(), CliError> {
    let mut session = Session::new(settings)?;
    info!(name = %session.game().settings.name, "interactive session started");
    println!("{}", commands::HELP);
    print_events(&mut session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let elapsed = last.elapsed().as_millis() as u64;
                last += Duration::from_millis(elapsed);
                session.advance(elapsed);
                print_events(&mut session);
            }
            line = lines.next_line() => {
                let Some(line) = line.map_err(CliError::Stdin)? else {
                    break;
                };
                match commands::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => execute(&mut session, command),
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                }
                print_events(&mut session);
            }
        }

        if session.outcome().is_some() {
            println!("{}", output::board(session.game()));
            break;
        }
    }

    session.shutdown();
    Ok(())
}

fn print_events(session: &mut Session) {
    let mut state_changed = false;
    for event in session.drain_events() {
        if let Some(line) = output::event_line(&event) {
            println!("{}", line);
        }
        state_changed |= matches!(event, hexsiege_core::SessionEvent::StateChanged);
    }
    if state_changed {
        debug!(status = %output::status_line(session.game()), "state changed");
    }
}

/// Run one command. Refusals are reported through the session's events.
fn execute(session: &mut Session, command: Command) {
    let result = match command {
        Command::Select(coord) => session.select(coord),
        Command::Recruit => session.recruit(),
        Command::Fortify => session.fortify(),
        Command::Expand(target) => session.expand(target),
        Command::Purify(target) => session.purify(target),
        Command::AttackSelected(target) => session.attack_selected(target),
        Command::Attack { source, target } => session.attack(source, target),
        Command::EndTurn => session.end_turn(),
        Command::Undo => session.undo(),
        Command::Admin { team, delta } => session.admin_adjust_ap(team, delta),
        Command::Pause => {
            let paused = session.toggle_pause();
            println!("{}", if paused { "paused" } else { "resumed" });
            Ok(())
        }
        Command::Show => {
            println!("{}", output::board(session.game()));
            Ok(())
        }
        Command::Save(path) => {
            report_file(save(session, &path));
            Ok(())
        }
        Command::Load(path) => {
            report_file(load(session, &path));
            Ok(())
        }
        Command::Help => {
            println!("{}", commands::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };
    if let Err(err) = result {
        debug!(%err, "command refused");
    }
}

fn report_file(result: Result<String, CliError>) {
    match result {
        Ok(done) => println!("{}", done),
        Err(e) => println!("Error: {}", e),
    }
}

fn save(session: &Session, path: &Path) -> Result<String, CliError> {
    let json = session.save().to_json()?;
    std::fs::write(path, json).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "snapshot saved");
    Ok(format!("saved to {}", path.display()))
}

fn load(session: &mut Session, path: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = Snapshot::from_json(&text)?;
    session.load(&snapshot)?;
    Ok(format!("loaded {}", path.display()))
}
