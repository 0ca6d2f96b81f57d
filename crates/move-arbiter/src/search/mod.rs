//! The search engine adapter.
//!
//! [`MoveSearch`] is the seam the [`Arbiter`](crate::Arbiter) depends on;
//! [`UciEngine`] implements it over one long-lived UCI process.

mod uci_engine;

pub use uci_engine::{UciEngine, MAX_UCI_LINES};

use crate::budget::SearchBudget;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a search produced no move.
#[derive(Error, Debug)]
pub enum SearchFailure {
    /// The engine was never started (or could not be).
    #[error("Search engine is not running")]
    EngineUnavailable,
    /// The engine died earlier and is not restarted.
    #[error("Search engine is dead")]
    EngineDead,
    /// No `bestmove` within the budget plus grace; the engine recovered after `stop`.
    #[error("No reply within {0:?}")]
    EngineTimeout(Duration),
    /// No `bestmove` within the budget plus grace, and none after `stop` either.
    #[error("Engine unresponsive after {0:?}")]
    Unresponsive(Duration),
    /// The engine answered, but not with a usable move.
    #[error("Malformed engine reply: {0}")]
    MalformedReply(String),
    /// The engine closed its output.
    #[error("Engine closed the connection")]
    Closed,
    /// Reading from or writing to the engine failed.
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchFailure {
    /// Whether the failure means the process can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SearchFailure::Unresponsive(_) | SearchFailure::Closed | SearchFailure::Io(_)
        )
    }
}

/// Lifecycle of the shared engine process.
///
/// `Unstarted -> Running` happens once at startup. `Running -> Dead` happens
/// on the first fatal failure or at shutdown. Nothing leads back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Unstarted,
    Running,
    Dead,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Unstarted => write!(f, "unstarted"),
            EngineState::Running => write!(f, "running"),
            EngineState::Dead => write!(f, "dead"),
        }
    }
}

/// Something that can propose a move for a position within a budget.
#[async_trait]
pub trait MoveSearch: Send + Sync {
    /// Returns a move in UCI notation. Implementations must resolve within
    /// roughly `budget.time_limit` once they start searching.
    async fn propose_move(&self, fen: &str, budget: SearchBudget) -> Result<String, SearchFailure>;
}

#[async_trait]
impl<T: MoveSearch + ?Sized> MoveSearch for Arc<T> {
    async fn propose_move(&self, fen: &str, budget: SearchBudget) -> Result<String, SearchFailure> {
        (**self).propose_move(fen, budget).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_failures() {
        assert!(SearchFailure::Closed.is_fatal());
        assert!(SearchFailure::Unresponsive(Duration::from_millis(600)).is_fatal());
        assert!(SearchFailure::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe"
        ))
        .is_fatal());

        assert!(!SearchFailure::EngineTimeout(Duration::from_millis(600)).is_fatal());
        assert!(!SearchFailure::MalformedReply("bestmove (none)".to_string()).is_fatal());
        assert!(!SearchFailure::EngineUnavailable.is_fatal());
        assert!(!SearchFailure::EngineDead.is_fatal());
    }

    #[test]
    fn state_display() {
        assert_eq!(EngineState::Unstarted.to_string(), "unstarted");
        assert_eq!(EngineState::Dead.to_string(), "dead");
    }
}
