//! Maps request paths and form bodies onto `GameState` operations
//!
//! Parsing never fails: a field that is missing or malformed becomes `None`
//! and the game decides what that means (a miss, or "keep the old value").

use crate::game::GameState;
use log::debug;
use shared::{Difficulty, GameSnapshot};

/// Paths answered by the game; everything else is a static file
pub const COMMAND_PATHS: [&str; 7] = [
    "/reset",
    "/game_state",
    "/hit",
    "/set_difficulty",
    "/pause",
    "/resume",
    "/spawn",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reset,
    QueryState,
    Hit { hole: Option<i64> },
    SetDifficulty { level: Option<Difficulty> },
    Pause { time_left_ms: Option<i64> },
    Resume,
    Spawn,
}

impl Command {
    /// Returns `None` for paths that are not game commands
    pub fn from_request(path: &str, body: &str) -> Option<Self> {
        let command = match path {
            "/reset" => Command::Reset,
            "/game_state" => Command::QueryState,
            "/hit" => Command::Hit {
                hole: form_field(body, "hole").and_then(parse_leading_int),
            },
            "/set_difficulty" => Command::SetDifficulty {
                level: form_field(body, "level")
                    .map(first_token)
                    .and_then(Difficulty::from_token),
            },
            "/pause" => Command::Pause {
                time_left_ms: form_field(body, "timeLeft").and_then(parse_leading_int),
            },
            "/resume" => Command::Resume,
            "/spawn" => Command::Spawn,
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Reset => "reset",
            Command::QueryState => "game_state",
            Command::Hit { .. } => "hit",
            Command::SetDifficulty { .. } => "set_difficulty",
            Command::Pause { .. } => "pause",
            Command::Resume => "resume",
            Command::Spawn => "spawn",
        }
    }
}

/// What the game loop hands back to the connection task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(&'static str),
    State(GameSnapshot),
}

pub fn dispatch(state: &mut GameState, command: Command) -> Reply {
    debug!("Dispatching {:?}", command);

    match command {
        Command::Reset => {
            state.reset();
            Reply::Text("reset")
        }
        Command::QueryState => Reply::State(state.snapshot()),
        Command::Hit { hole } => Reply::Text(state.resolve_hit(hole).as_str()),
        Command::SetDifficulty { level } => {
            state.set_difficulty(level);
            Reply::Text("ok")
        }
        Command::Pause { time_left_ms } => {
            state.pause(time_left_ms);
            Reply::Text("paused")
        }
        Command::Resume => {
            state.resume();
            Reply::Text("resumed")
        }
        Command::Spawn => Reply::Text(state.maybe_spawn().as_str()),
    }
}

fn form_field<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim_start() == key)
        .map(|(_, value)| value)
}

// Leading whitespace and sign, then digits; anything after the digits is ignored.
fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign_len = usize::from(value.starts_with(|c: char| c == '+' || c == '-'));
    let digits_len = value[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits_len == 0 {
        return None;
    }
    value[..sign_len + digits_len].parse().ok()
}

fn first_token(value: &str) -> &str {
    value.split_whitespace().next().unwrap_or("")
}
