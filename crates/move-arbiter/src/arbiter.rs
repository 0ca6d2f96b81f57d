//! The per-request move selection state machine.
//!
//! ```text
//! ValidateInput -> Enumerate -> Invoke -> ValidateResult -> (engine move)
//!       |              |           \            |
//!  InvalidPosition NoLegalMoves     +-----------+--> RandomFallback
//! ```
//!
//! Only the two terminal input errors reach the caller. Everything that can
//! go wrong with the engine ends in a random legal move instead.

use crate::budget::map_rating;
use crate::error::ArbiterError;
use crate::rules::{LegalMoves, Position};
use crate::search::MoveSearch;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Where a move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// The search engine proposed it and it is legal.
    Engine,
    /// Picked uniformly at random from the legal moves.
    Fallback,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Engine => write!(f, "engine"),
            Origin::Fallback => write!(f, "fallback"),
        }
    }
}

/// A move chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    /// The move in UCI notation, always a member of the legal move set.
    #[serde(rename = "move")]
    pub mv: String,
    pub origin: Origin,
}

/// Chooses moves using a search engine and an injected source of randomness.
pub struct Arbiter<S, R = StdRng> {
    search: S,
    rng: Mutex<R>,
}

impl<S, R> Arbiter<S, R>
where
    S: MoveSearch,
    R: Rng + Send,
{
    pub fn new(search: S, rng: R) -> Self {
        Self {
            search,
            rng: Mutex::new(rng),
        }
    }

    /// The search engine this arbiter consults.
    pub fn search(&self) -> &S {
        &self.search
    }

    /// Proposes a move for `fen` at roughly the strength of `skill_rating`.
    ///
    /// # Errors
    ///
    /// - [`ArbiterError::InvalidPosition`] if `fen` is not a legal board state
    /// - [`ArbiterError::NoLegalMoves`] if the side to move is mated or stalemated
    ///
    /// Engine failures are never returned; they yield [`Origin::Fallback`].
    pub async fn propose_move(
        &self,
        fen: &str,
        skill_rating: i64,
    ) -> Result<MoveResult, ArbiterError> {
        let position = Position::from_fen(fen)?;

        let legal = position.legal_moves();
        if legal.is_empty() {
            tracing::debug!(in_check = legal.in_check, "No legal moves");
            return Err(ArbiterError::NoLegalMoves);
        }
        tracing::debug!(
            turn = %legal.turn,
            in_check = legal.in_check,
            legal_moves = legal.len(),
            "Position accepted"
        );

        let budget = map_rating(skill_rating);
        match self.search.propose_move(position.fen(), budget).await {
            Ok(mv) => match legal.find(&mv) {
                Some(legal_mv) => {
                    return Ok(MoveResult {
                        mv: legal_mv.to_string(),
                        origin: Origin::Engine,
                    });
                }
                None => tracing::warn!(
                    mv = %mv,
                    fen = position.fen(),
                    "Engine proposed an illegal move"
                ),
            },
            Err(e) => tracing::warn!(error = %e, "Engine search failed"),
        }

        self.fallback(&legal)
    }

    fn fallback(&self, legal: &LegalMoves) -> Result<MoveResult, ArbiterError> {
        let mut rng = self.rng.lock();
        match legal.as_slice().choose(&mut *rng) {
            Some(mv) => {
                tracing::info!(mv = %mv, candidates = legal.len(), "Using random move");
                Ok(MoveResult {
                    mv: mv.clone(),
                    origin: Origin::Fallback,
                })
            }
            None => {
                debug_assert!(false, "fallback reached with no legal moves");
                Err(ArbiterError::Internal(
                    "fallback reached with no legal moves",
                ))
            }
        }
    }
}
