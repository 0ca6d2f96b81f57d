//! Position parsing and legal move enumeration.
//!
//! Legality is delegated entirely to `shakmaty`; this module only adapts its
//! types to the string-based moves exchanged with UCI engines and clients.

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position as _};
use std::fmt;
use thiserror::Error;

/// Why a FEN string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("empty position")]
    Empty,
    #[error("position contains control characters")]
    ControlCharacters,
    #[error("malformed FEN: {0}")]
    Malformed(String),
    #[error("illegal setup: {0}")]
    IllegalSetup(String),
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "white"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// A validated board position.
///
/// Holds the FEN re-rendered from the parsed board, with every field
/// spelled out, so the engine searches exactly the position whose legal
/// moves were enumerated.
#[derive(Debug, Clone)]
pub struct Position {
    fen: String,
    board: Chess,
}

impl Position {
    /// Parses and validates a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(PositionError::Empty);
        }
        // the FEN is forwarded on a line protocol
        if fen.chars().any(char::is_control) {
            return Err(PositionError::ControlCharacters);
        }

        let parsed: Fen = fen
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| PositionError::Malformed(e.to_string()))?;
        let board: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| PositionError::IllegalSetup(e.to_string()))?;

        // abbreviated input is completed with shakmaty's defaults
        let fen = Fen::from_position(board.clone(), EnPassantMode::Legal).to_string();
        Ok(Self { fen, board })
    }

    /// The canonical six-field FEN of the parsed position.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Enumerates all legal moves in UCI notation.
    pub fn legal_moves(&self) -> LegalMoves {
        let moves = self
            .board
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect();

        LegalMoves {
            moves,
            turn: self.board.turn().into(),
            in_check: self.board.is_check(),
        }
    }
}

/// The legal continuations of a position plus basic board metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoves {
    moves: Vec<String>,
    /// Side to move.
    pub turn: Side,
    /// Whether the side to move is in check.
    pub in_check: bool,
}

impl LegalMoves {
    /// Returns the legal move matching `mv` in canonical form, if any.
    ///
    /// Some engines print the promotion piece in upper case, so the token is
    /// lowercased before matching.
    pub fn find(&self, mv: &str) -> Option<&str> {
        let wanted = mv.trim().to_ascii_lowercase();
        self.moves
            .iter()
            .find(|legal| **legal == wanted)
            .map(String::as_str)
    }

    pub fn contains(&self, mv: &str) -> bool {
        self.find(mv).is_some()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True for checkmate and stalemate positions.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
