//! UCI command formatting and parsing.

use crate::UciError;

/// Commands the controller writes to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    Uci,
    /// Ask for `readyok` once pending commands are done.
    IsReady,
    /// Reset engine state between unrelated positions.
    UciNewGame,
    /// Set an engine option.
    SetOption { name: String, value: Option<String> },
    /// Load a position; `fen: None` means the standard start.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoOptions),
    /// Ask for `bestmove` now.
    Stop,
    Quit,
    /// Any line this crate does not model, kept verbatim.
    Unknown(String),
}

/// Search limits for `go`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Wall-clock limit in milliseconds.
    pub movetime: Option<u64>,
    /// Ply limit.
    pub depth: Option<u32>,
    /// No limit; runs until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    /// A search bounded by both a depth and a time ceiling.
    pub fn bounded(depth: u32, movetime: u64) -> Self {
        Self {
            movetime: Some(movetime),
            depth: Some(depth),
            infinite: false,
        }
    }
}

impl GuiCommand {
    /// Format the command as a single protocol line (without newline).
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                if let Some(t) = opts.movetime {
                    parts.push(format!("movetime {}", t));
                }
                if opts.infinite {
                    parts.push("infinite".to_string());
                }
                parts.join(" ")
            }
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
            GuiCommand::Unknown(line) => line.clone(),
        }
    }

    /// Parses one protocol line as an engine would read it.
    ///
    /// Unrecognised commands become [`GuiCommand::Unknown`]; only malformed
    /// `position` and `setoption` lines are errors.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let line = input.trim();
        let (keyword, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let args = args.trim_start();

        Ok(match keyword {
            "uci" => GuiCommand::Uci,
            "isready" => GuiCommand::IsReady,
            "ucinewgame" => GuiCommand::UciNewGame,
            "stop" => GuiCommand::Stop,
            "quit" => GuiCommand::Quit,
            "setoption" => Self::parse_setoption(args)?,
            "position" => Self::parse_position(args)?,
            "go" => GuiCommand::Go(GoOptions::parse(args)),
            _ => GuiCommand::Unknown(line.to_string()),
        })
    }

    fn parse_setoption(args: &str) -> Result<Self, UciError> {
        let option = args
            .strip_prefix("name ")
            .ok_or_else(|| UciError::InvalidCommand("setoption requires 'name'".to_string()))?;

        let (name, value) = match option.split_once(" value ") {
            Some((name, value)) => (name, Some(value.trim().to_string())),
            None => (option, None),
        };
        Ok(GuiCommand::SetOption {
            name: name.trim().to_string(),
            value,
        })
    }

    fn parse_position(args: &str) -> Result<Self, UciError> {
        let (setup, moves) = match args.split_once("moves") {
            Some((setup, moves)) => (setup.trim(), split_words(moves)),
            None => (args.trim(), Vec::new()),
        };

        let fen = match setup.split_once(char::is_whitespace).unwrap_or((setup, "")) {
            ("startpos", _) => None,
            ("fen", fen) if !fen.trim().is_empty() => Some(fen.trim().to_string()),
            (kind, _) => {
                return Err(UciError::ParseError(format!(
                    "position needs 'startpos' or 'fen <fen>', got '{}'",
                    kind
                )))
            }
        };
        Ok(GuiCommand::Position { fen, moves })
    }
}

impl GoOptions {
    /// Reads the limits this crate understands, ignoring any others.
    fn parse(args: &str) -> Self {
        let mut opts = GoOptions::default();
        let mut tokens = args.split_whitespace();
        while let Some(token) = tokens.next() {
            match token {
                "depth" => opts.depth = tokens.next().and_then(|v| v.parse().ok()),
                "movetime" => opts.movetime = tokens.next().and_then(|v| v.parse().ok()),
                "infinite" => opts.infinite = true,
                _ => {}
            }
        }
        opts
    }
}

fn split_words(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}
