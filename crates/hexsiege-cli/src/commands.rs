//! Line command parser for interactive play.

use hexsiege_core::{HexCoord, TeamId};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Select(HexCoord),
    Recruit,
    Fortify,
    Expand(HexCoord),
    Purify(HexCoord),
    /// Attack from the selection.
    AttackSelected(HexCoord),
    Attack {
        source: HexCoord,
        target: HexCoord,
    },
    EndTurn,
    Undo,
    Admin {
        team: TeamId,
        delta: i32,
    },
    Pause,
    Show,
    Save(PathBuf),
    Load(PathBuf),
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' takes no arguments")]
    NoArguments(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

pub const HELP: &str = "\
commands:
  select q r            select a tile
  recruit               +1 power on the selected tile
  fortify               shield the selected tile
  expand q r            claim a neutral tile next to your territory
  purify q r            return an AI tile to neutral
  attack q r            attack from the selected tile
  attack q1 r1 q2 r2    attack from (q1, r1) to (q2, r2)
  end                   end your turn
  undo                  undo the last action or turn change
  admin team delta      adjust a team's AP
  pause                 pause or resume the turn clock
  show                  print the board and teams
  save path / load path write or read a snapshot
  quit";

fn number<T: std::str::FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::NotANumber(word.to_string()))
}

fn coord(q: &str, r: &str) -> Result<HexCoord, ParseError> {
    Ok(HexCoord::new(number(q)?, number(r)?))
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match (head.to_ascii_lowercase().as_str(), args) {
        ("select" | "sel", [q, r]) => Command::Select(coord(q, r)?),
        ("select" | "sel", _) => return Err(ParseError::Usage("select q r")),
        ("recruit", []) => Command::Recruit,
        ("fortify", []) => Command::Fortify,
        ("expand", [q, r]) => Command::Expand(coord(q, r)?),
        ("expand", _) => return Err(ParseError::Usage("expand q r")),
        ("purify", [q, r]) => Command::Purify(coord(q, r)?),
        ("purify", _) => return Err(ParseError::Usage("purify q r")),
        ("attack", [q, r]) => Command::AttackSelected(coord(q, r)?),
        ("attack", [q1, r1, q2, r2]) => Command::Attack {
            source: coord(q1, r1)?,
            target: coord(q2, r2)?,
        },
        ("attack", _) => return Err(ParseError::Usage("attack q r | attack q1 r1 q2 r2")),
        ("end", []) => Command::EndTurn,
        ("undo", []) => Command::Undo,
        ("admin", [team, delta]) => Command::Admin {
            team: number(team)?,
            delta: number(delta)?,
        },
        ("admin", _) => return Err(ParseError::Usage("admin team delta")),
        ("pause", []) => Command::Pause,
        ("show", []) => Command::Show,
        ("save", [path]) => Command::Save(PathBuf::from(*path)),
        ("load", [path]) => Command::Load(PathBuf::from(*path)),
        ("save" | "load", _) => return Err(ParseError::Usage("save path | load path")),
        ("recruit" | "fortify" | "end" | "undo" | "pause" | "show", _) => {
            return Err(ParseError::NoArguments(head.to_string()))
        }
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => return Err(ParseError::Unknown(head.to_string())),
    };
    Ok(Some(command))
}
