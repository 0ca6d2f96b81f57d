//! UCI (Universal Chess Interface) protocol library.
//!
//! This crate provides types and parsing for the UCI protocol as seen from the
//! controlling side: commands the service sends to an external search engine,
//! and the messages the engine answers with.
//!
//! # Commands sent to the engine
//!
//! - `uci` - Switch the engine to UCI mode and ask for its identity
//! - `isready` - Wait until earlier commands have been processed
//! - `setoption name <name> value <value>` - Configure the engine
//! - `position fen <fen> [moves <move>...]` - Load the position to search
//! - `go [depth <d>] [movetime <ms>]` - Start a bounded search
//! - `stop` - End the current search early
//! - `quit` - Terminate the process
//!
//! # Messages read back
//!
//! - `id name <name>`, `uciok`, `readyok`
//! - `info ...` - Search progress
//! - `bestmove <move> [ponder <move>]` - Search result

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};

use thiserror::Error;

/// A protocol line that could not be understood. The crate does no I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A line of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// One `id` line; engines send name and author separately.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// End of the `uci` reply.
    UciOk,
    /// Answer to `isready`.
    ReadyOk,
    Info(EngineInfo),
    /// Final answer of a search.
    BestMove { mv: String, ponder: Option<String> },
    /// Anything else (option declarations, copyright banners, ...).
    Unknown(String),
}

impl EngineMessage {
    /// Parse a single line of engine output.
    ///
    /// Lines the protocol does not define are returned as
    /// [`EngineMessage::Unknown`]. A `bestmove` line without a move token
    /// is an error: it is the one reply the controller cannot skip over.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next().unwrap_or("") {
            "uciok" => Ok(EngineMessage::UciOk),
            "readyok" => Ok(EngineMessage::ReadyOk),
            "id" => match parts.next() {
                Some("name") => Ok(EngineMessage::Id {
                    name: Some(parts.collect::<Vec<_>>().join(" ")),
                    author: None,
                }),
                Some("author") => Ok(EngineMessage::Id {
                    name: None,
                    author: Some(parts.collect::<Vec<_>>().join(" ")),
                }),
                _ => Ok(EngineMessage::Unknown(line.to_string())),
            },
            "info" => Ok(EngineInfo::parse(line)
                .map(EngineMessage::Info)
                .unwrap_or_else(|| EngineMessage::Unknown(line.to_string()))),
            "bestmove" => {
                let mv = parts
                    .next()
                    .ok_or_else(|| UciError::ParseError("bestmove without a move".to_string()))?;
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(str::to_string),
                    _ => None,
                };
                Ok(EngineMessage::BestMove {
                    mv: mv.to_string(),
                    ponder,
                })
            }
            _ => Ok(EngineMessage::Unknown(line.to_string())),
        }
    }

    /// Renders the message as the engine would print it.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::Id { name, author } => {
                let mut parts = Vec::new();
                if let Some(n) = name {
                    parts.push(format!("id name {}", n));
                }
                if let Some(a) = author {
                    parts.push(format!("id author {}", a));
                }
                parts.join("\n")
            }
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
            EngineMessage::Unknown(line) => line.clone(),
        }
    }
}
