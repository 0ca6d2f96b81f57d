//! Search engine settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// How to launch and talk to the external search process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    /// Path to the UCI engine executable.
    /// Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub path: PathBuf,
    /// Extra command line arguments for the engine.
    #[serde(default)]
    pub args: Vec<String>,
    /// Upper bound for the `uci`/`isready` handshake at startup.
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,
    /// Slack on top of a search's time limit before the search counts as
    /// timed out. Also bounds the wait for a late `bestmove` after `stop`.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    /// UCI options sent once after the handshake, e.g. `Threads = "2"`.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_engine_path() -> PathBuf {
    PathBuf::from("stockfish")
}

fn default_handshake_timeout_ms() -> u64 {
    5000
}

fn default_grace_ms() -> u64 {
    500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            grace_ms: default_grace_ms(),
            options: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}
