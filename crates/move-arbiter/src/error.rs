//! Errors surfaced to callers of the arbiter.
//!
//! Engine trouble never shows up here; it is absorbed by the random fallback
//! and only visible through [`Origin::Fallback`](crate::Origin::Fallback).

use crate::rules::PositionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    /// The input is not a well-formed, legal board state.
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
    /// Checkmate or stalemate: there is nothing to play.
    #[error("No legal moves available")]
    NoLegalMoves,
    /// An invariant of the arbiter itself was broken.
    #[error("Internal error: {0}")]
    Internal(&'static str),
}
