//! Skill-calibrated move selection.
//!
//! Given a position and a requested skill rating, the [`Arbiter`] asks a
//! shared external UCI search process for a move under a rating-dependent
//! budget, checks the answer against the legal move set, and falls back to a
//! uniformly random legal move whenever the engine is missing, slow, or wrong.
//!
//! # Components
//!
//! - [`budget`] - rating to search budget table
//! - [`rules`] - FEN parsing and legal move enumeration
//! - [`search`] - the serialized, time-bounded engine adapter
//! - [`arbiter`] - the per-request state machine
//!
//! # Example
//!
//! ```no_run
//! use move_arbiter::{Arbiter, EngineConfig, UciEngine};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), move_arbiter::ArbiterError> {
//! let engine = Arc::new(UciEngine::start(&EngineConfig::default()).await);
//! let arbiter = Arbiter::new(Arc::clone(&engine), StdRng::from_entropy());
//!
//! let result = arbiter
//!     .propose_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1500)
//!     .await?;
//! println!("{} ({})", result.mv, result.origin);
//!
//! engine.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod arbiter;
pub mod budget;
pub mod config;
pub mod error;
pub mod rules;
pub mod search;

pub use arbiter::{Arbiter, MoveResult, Origin};
pub use budget::{map_rating, SearchBudget};
pub use config::EngineConfig;
pub use error::ArbiterError;
pub use rules::{LegalMoves, Position, PositionError, Side};
pub use search::{EngineState, MoveSearch, SearchFailure, UciEngine};
