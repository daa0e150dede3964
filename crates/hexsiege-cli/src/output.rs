//! Text rendering of session state and events.

use hexsiege_core::{Game, Owner, SessionEvent, Slot};

/// One line per event worth showing; tile refreshes are folded away.
pub fn event_line(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::TurnStarted { team, round } => {
            Some(format!("== round {}, team {} to move ==", round, team))
        }
        SessionEvent::AiTurnStarted { round } => Some(format!("== round {}, AI turn ==", round)),
        SessionEvent::InvasionStarted { round, landmarks } => Some(format!(
            "!! invasion in round {}: {} landmarks seized",
            round, landmarks
        )),
        SessionEvent::Message { text } => Some(text.clone()),
        SessionEvent::Diagnostic { text } => Some(format!("[diagnostic] {}", text)),
        SessionEvent::GameOver { outcome } => Some(format!("GAME OVER: {}", outcome)),
        SessionEvent::TileChanged { .. } | SessionEvent::StateChanged => None,
    }
}

/// Short status line: round, slot, clock, AP of the acting team.
pub fn status_line(game: &Game) -> String {
    let state = &game.state;
    let mut line = format!("round {} | {}", state.current_round, state.current_turn);
    if let Slot::Team(id) = state.current_turn {
        if let Some(team) = game.teams.get(id) {
            line.push_str(&format!(" | {} AP", team.ap));
        }
        line.push_str(&format!(" | {}s", state.time_left));
        if state.paused {
            line.push_str(" (paused)");
        }
    }
    line
}

fn tile_glyph(owner: Owner) -> char {
    match owner {
        Owner::Neutral => '.',
        Owner::Team(id) => char::from_digit(id as u32, 10).unwrap_or('?'),
        Owner::Ai => 'X',
    }
}

/// Board as rows of owner glyphs with power, followed by the ledger.
pub fn board(game: &Game) -> String {
    let mut out = String::new();
    let mut row = None;
    for tile in game.board.all_tiles() {
        let coord = tile.coord();
        if row != Some(coord.r) {
            if row.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{:>3} ", coord.r));
            out.push_str(&" ".repeat(coord.r.unsigned_abs() as usize * 2));
            row = Some(coord.r);
        }
        let shield = if tile.is_shielded() { '*' } else { ' ' };
        out.push_str(&format!("{}{}{} ", tile_glyph(tile.owner()), tile.power(), shield));
    }
    out.push('\n');

    let stats = game.board.stats();
    for team in game.teams.iter() {
        let owner = Owner::Team(team.id);
        out.push_str(&format!(
            "team {} ({}): {} AP, {} tiles, {} landmarks, {} purified\n",
            team.id,
            team.color,
            team.ap,
            stats.tiles(owner),
            stats.landmarks(owner),
            team.purify_count
        ));
    }
    out.push_str(&format!("AI: {} tiles\n", stats.tiles(Owner::Ai)));
    out.push_str(&status_line(game));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexsiege_core::{GameSettings, Outcome};

    #[test]
    fn test_event_lines() {
        assert_eq!(
            event_line(&SessionEvent::TurnStarted { team: 2, round: 4 }),
            Some("== round 4, team 2 to move ==".to_string())
        );
        assert_eq!(event_line(&SessionEvent::StateChanged), None);
        assert!(event_line(&SessionEvent::GameOver {
            outcome: Outcome::TeamsWin
        })
        .unwrap()
        .starts_with("GAME OVER"));
    }

    #[test]
    fn test_board_lists_every_team() {
        let game = Game::new(GameSettings::skirmish("Render".to_string(), 3, 0)).unwrap();
        let text = board(&game);
        assert!(text.contains("team 1 (Orange): 9 AP, 1 tiles"));
        assert!(text.contains("team 3 (Green): 10 AP"));
        assert!(text.contains("AI: 0 tiles"));
        assert!(text.ends_with("round 1 | team 1 | 9 AP | 30s"));
    }
}
