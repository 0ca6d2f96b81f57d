//! A scripted UCI engine running over in-memory pipes.
//!
//! It speaks just enough of the protocol for the adapter's handshake and
//! searches, and records every line in both directions so tests can check
//! ordering.

#![allow(dead_code)]

use move_arbiter::{EngineConfig, UciEngine};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use uci::{EngineInfo, EngineMessage, GoOptions, GuiCommand, Score};

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
pub const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
pub const MIDDLEGAME: &str = "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 1 5";
pub const PROMOTION: &str = "8/4P3/8/8/8/8/k7/7K w - - 0 1";
pub const IN_CHECK: &str = "rnbqkbnr/ppp2ppp/8/1B1pp3/4P3/8/PPPP1PPP/RNBQK1NR b KQkq - 1 3";

pub const ENGINE_NAME: &str = "Scripted 1.0";

/// What the scripted engine does when it receives `go`.
#[derive(Debug, Clone)]
pub enum Reply {
    /// An info line followed by `bestmove`.
    Move(&'static str),
    /// `bestmove` after sleeping.
    MoveAfter(Duration, &'static str),
    /// A single raw line instead of a proper reply.
    Raw(&'static str),
    /// Nothing until `stop`, then `bestmove a2a3`.
    Silent,
    /// Ignores both `go` and `stop`.
    Mute,
    /// Closes its output.
    HangUp,
}

/// Every line exchanged, prefixed with `> ` (to engine) or `< ` (from engine).
#[derive(Debug, Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<String>>>);

impl Transcript {
    fn push(&self, line: String) {
        self.0.lock().unwrap().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Only the `go` commands and `bestmove` replies, in order.
    pub fn searches(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.starts_with("> go") || l.starts_with("< bestmove"))
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

/// Engine settings tuned so timeout tests finish quickly.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        handshake_timeout_ms: 1000,
        grace_ms: 50,
        ..EngineConfig::default()
    }
}

pub fn config_with_options(options: &[(&str, &str)]) -> EngineConfig {
    EngineConfig {
        options: options
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..test_config()
    }
}

/// Starts a scripted engine and connects an adapter to it.
pub async fn scripted<F>(script: F) -> (Arc<UciEngine>, Transcript)
where
    F: FnMut(&GoOptions) -> Reply + Send + 'static,
{
    scripted_with(test_config(), script).await
}

pub async fn scripted_with<F>(config: EngineConfig, mut script: F) -> (Arc<UciEngine>, Transcript)
where
    F: FnMut(&GoOptions) -> Reply + Send + 'static,
{
    let (ours, theirs) = tokio::io::duplex(64 * 1024);
    let (their_read, mut their_write) = tokio::io::split(theirs);
    let transcript = Transcript::default();
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<GuiCommand>();

    // log commands as they arrive, independent of how busy the responder is
    let log = transcript.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(their_read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            log.push(format!("> {}", line));
            if let Ok(cmd) = GuiCommand::parse(&line) {
                if cmd_tx.send(cmd).is_err() {
                    break;
                }
            }
        }
    });

    let log = transcript.clone();
    tokio::spawn(async move {
        let mut answer_on_stop: Option<String> = None;
        while let Some(cmd) = cmd_rx.recv().await {
            let replies: Vec<String> = match cmd {
                GuiCommand::Uci => vec![
                    EngineMessage::Id {
                        name: Some(ENGINE_NAME.to_string()),
                        author: None,
                    }
                    .to_uci(),
                    "option name Threads type spin default 1 min 1 max 512".to_string(),
                    EngineMessage::UciOk.to_uci(),
                ],
                GuiCommand::IsReady => vec![EngineMessage::ReadyOk.to_uci()],
                GuiCommand::Go(opts) => match script(&opts) {
                    Reply::Move(mv) => vec![
                        EngineInfo {
                            depth: opts.depth,
                            score: Some(Score::Cp(20)),
                            nodes: Some(1000),
                            pv: vec![mv.to_string()],
                            ..Default::default()
                        }
                        .to_uci(),
                        bestmove(mv),
                    ],
                    Reply::MoveAfter(delay, mv) => {
                        tokio::time::sleep(delay).await;
                        vec![bestmove(mv)]
                    }
                    Reply::Raw(line) => vec![line.to_string()],
                    Reply::Silent => {
                        answer_on_stop = Some(bestmove("a2a3"));
                        vec![]
                    }
                    Reply::Mute => vec![],
                    Reply::HangUp => {
                        let _ = their_write.shutdown().await;
                        return;
                    }
                },
                GuiCommand::Stop => answer_on_stop.take().into_iter().collect(),
                GuiCommand::Quit => return,
                _ => vec![],
            };

            for line in replies {
                log.push(format!("< {}", line));
                if their_write
                    .write_all(format!("{}\n", line).as_bytes())
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
    });

    let (reader, writer) = tokio::io::split(ours);
    let engine = UciEngine::connect(reader, writer, &config)
        .await
        .expect("scripted engine handshake");
    (Arc::new(engine), transcript)
}

fn bestmove(mv: &str) -> String {
    EngineMessage::BestMove {
        mv: mv.to_string(),
        ponder: None,
    }
    .to_uci()
}
