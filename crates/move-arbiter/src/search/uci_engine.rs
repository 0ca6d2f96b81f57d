//! One UCI engine process shared by every request.
//!
//! All searches go through a single fair (FIFO) async mutex, so at most one
//! `go` is ever outstanding and waiting requests are served in arrival order.
//! Every search is bounded by its time limit plus a grace period; a search
//! that overruns is stopped and its late `bestmove` drained so the protocol
//! stays in step for the next caller.
//!
//! Once the lock is taken, the exchange runs on its own task holding the
//! guard. A caller that gives up (client disconnect, outer timeout) only
//! stops waiting; the search still reads its `bestmove` before the next
//! caller can write `go`.

use super::{EngineState, MoveSearch, SearchFailure};
use crate::budget::SearchBudget;
use crate::config::EngineConfig;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use uci::{EngineInfo, EngineMessage, GoOptions, GuiCommand};

/// Maximum number of lines to read before giving up on a handshake reply.
pub const MAX_UCI_LINES: usize = 1000;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The pipes to a running engine, plus the process when we own one.
struct Connection {
    lines: Lines<BufReader<BoxedReader>>,
    writer: BoxedWriter,
    child: Option<Child>,
}

impl Connection {
    fn new(reader: BoxedReader, writer: BoxedWriter, child: Option<Child>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            child,
        }
    }

    async fn send(&mut self, cmd: &GuiCommand) -> Result<(), SearchFailure> {
        let line = cmd.to_uci();
        tracing::trace!(">> {}", line);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<EngineMessage, SearchFailure> {
        let line = self.lines.next_line().await?.ok_or(SearchFailure::Closed)?;
        tracing::trace!("<< {}", line);
        EngineMessage::parse(&line).map_err(|e| SearchFailure::MalformedReply(e.to_string()))
    }

    /// Runs `uci`, applies options, then waits for `readyok`.
    ///
    /// Returns the name the engine reported, if any.
    async fn handshake(
        &mut self,
        options: &BTreeMap<String, String>,
    ) -> Result<Option<String>, SearchFailure> {
        self.send(&GuiCommand::Uci).await?;

        let mut name = None;
        let mut lines_read = 0;
        loop {
            if lines_read >= MAX_UCI_LINES {
                return Err(SearchFailure::MalformedReply(
                    "Too many lines without uciok".to_string(),
                ));
            }
            lines_read += 1;
            match self.read_message().await? {
                EngineMessage::Id { name: Some(n), .. } => name = Some(n),
                EngineMessage::UciOk => break,
                _ => {}
            }
        }

        for (option, value) in options {
            self.send(&GuiCommand::SetOption {
                name: option.clone(),
                value: Some(value.clone()),
            })
            .await?;
        }

        self.send(&GuiCommand::IsReady).await?;
        let mut lines_read = 0;
        loop {
            if lines_read >= MAX_UCI_LINES {
                return Err(SearchFailure::MalformedReply(
                    "Too many lines without readyok".to_string(),
                ));
            }
            lines_read += 1;
            if self.read_message().await? == EngineMessage::ReadyOk {
                break;
            }
        }

        Ok(name)
    }

    /// Reads until `bestmove`, keeping the last exact-score info line.
    async fn read_bestmove(&mut self) -> Result<(String, Option<EngineInfo>), SearchFailure> {
        let mut last_info = None;
        loop {
            match self.read_message().await? {
                EngineMessage::Info(info) if info.depth.is_some() && !info.bound => {
                    last_info = Some(info);
                }
                EngineMessage::BestMove { mv, .. } => return Ok((mv, last_info)),
                _ => {}
            }
        }
    }

    async fn search(
        &mut self,
        fen: &str,
        budget: SearchBudget,
        grace: Duration,
    ) -> Result<String, SearchFailure> {
        self.send(&GuiCommand::Position {
            fen: Some(fen.to_string()),
            moves: Vec::new(),
        })
        .await?;
        self.send(&GuiCommand::Go(GoOptions::bounded(
            budget.depth,
            budget.movetime_ms(),
        )))
        .await?;

        let deadline = budget.time_limit + grace;
        let (mv, info) = match timeout(deadline, self.read_bestmove()).await {
            Ok(reply) => reply?,
            Err(_) => return Err(self.resync(deadline, grace).await),
        };

        if let Some(info) = info {
            tracing::debug!(
                depth = ?info.depth,
                score = ?info.score,
                nodes = ?info.nodes,
                "Deepest completed iteration"
            );
        }

        // what engines print when they have nothing to play
        match mv.as_str() {
            "(none)" | "0000" => Err(SearchFailure::MalformedReply(format!(
                "null move '{}'",
                mv
            ))),
            _ => Ok(mv),
        }
    }

    /// Stops an overrunning search and swallows its late `bestmove`.
    ///
    /// The outcome is `EngineTimeout` if the engine answered `stop` within
    /// the grace period, `Unresponsive` otherwise.
    async fn resync(&mut self, waited: Duration, grace: Duration) -> SearchFailure {
        if self.send(&GuiCommand::Stop).await.is_err() {
            return SearchFailure::Unresponsive(waited);
        }
        match timeout(grace, self.read_bestmove()).await {
            Ok(Ok(_)) | Ok(Err(SearchFailure::MalformedReply(_))) => {
                SearchFailure::EngineTimeout(waited)
            }
            _ => SearchFailure::Unresponsive(waited + grace),
        }
    }

    /// Kills the process without waiting, for engines we gave up on.
    fn abandon(mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
    }

    /// Asks the engine to quit, killing it if it does not exit in time.
    async fn close(mut self, grace: Duration) {
        let _ = self.send(&GuiCommand::Quit).await;
        if let Some(mut child) = self.child.take() {
            if timeout(grace, child.wait()).await.is_err() {
                let _ = child.kill().await;
            }
        }
    }
}

/// The shared search process.
///
/// Created once at startup with [`UciEngine::start`]; a failed start leaves
/// it [`EngineState::Unstarted`] and every search fails immediately. After the
/// first fatal failure it is [`EngineState::Dead`] for good.
pub struct UciEngine {
    connection: Arc<Mutex<Option<Connection>>>,
    state: Arc<RwLock<EngineState>>,
    name: Option<String>,
    grace: Duration,
}

impl UciEngine {
    /// Spawns the configured engine and performs the UCI handshake.
    ///
    /// Never fails: an engine that cannot be started is logged and the
    /// returned adapter stays `Unstarted`.
    pub async fn start(config: &EngineConfig) -> Self {
        match Self::spawn(config).await {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(
                    path = %config.path.display(),
                    error = %e,
                    "Search engine unavailable, serving random moves"
                );
                Self::unstarted(config)
            }
        }
    }

    /// An adapter with no engine behind it.
    pub fn unstarted(config: &EngineConfig) -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            state: Arc::new(RwLock::new(EngineState::Unstarted)),
            name: None,
            grace: config.grace(),
        }
    }

    /// Performs the handshake over already-open pipes.
    ///
    /// The caller keeps ownership of whatever sits on the other end; no
    /// process is spawned or killed.
    pub async fn connect<R, W>(
        reader: R,
        writer: W,
        config: &EngineConfig,
    ) -> Result<Self, SearchFailure>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::establish(
            Connection::new(Box::new(reader), Box::new(writer), None),
            config,
        )
        .await
    }

    async fn spawn(config: &EngineConfig) -> Result<Self, SearchFailure> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or(SearchFailure::EngineUnavailable)?;
        let stdout = child.stdout.take().ok_or(SearchFailure::EngineUnavailable)?;

        Self::establish(
            Connection::new(Box::new(stdout), Box::new(stdin), Some(child)),
            config,
        )
        .await
    }

    async fn establish(mut conn: Connection, config: &EngineConfig) -> Result<Self, SearchFailure> {
        let name = timeout(config.handshake_timeout(), conn.handshake(&config.options))
            .await
            .map_err(|_| SearchFailure::Unresponsive(config.handshake_timeout()))??;

        tracing::info!(
            engine = name.as_deref().unwrap_or("unknown"),
            options = config.options.len(),
            "Search engine ready"
        );

        Ok(Self {
            connection: Arc::new(Mutex::new(Some(conn))),
            state: Arc::new(RwLock::new(EngineState::Running)),
            name,
            grace: config.grace(),
        })
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    /// The name from the engine's `id name` line.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn unavailable(&self) -> SearchFailure {
        match self.state() {
            EngineState::Dead => SearchFailure::EngineDead,
            _ => SearchFailure::EngineUnavailable,
        }
    }

    /// Terminates the engine process.
    ///
    /// Waits for an in-flight search to finish first. Safe to call more than
    /// once and on an adapter that never started.
    pub async fn shutdown(&self) {
        let conn = self.connection.lock().await.take();
        if let Some(conn) = conn {
            *self.state.write() = EngineState::Dead;
            conn.close(self.grace).await;
            tracing::info!("Search engine stopped");
        }
    }
}

/// Runs one search to completion while holding the connection.
///
/// Owns everything it touches so it can outlive the request that started it.
async fn run_search(
    mut slot: OwnedMutexGuard<Option<Connection>>,
    state: Arc<RwLock<EngineState>>,
    fen: String,
    budget: SearchBudget,
    grace: Duration,
) -> Result<String, SearchFailure> {
    let Some(conn) = slot.as_mut() else {
        return Err(SearchFailure::EngineDead);
    };

    tracing::debug!(
        depth = budget.depth,
        movetime_ms = budget.movetime_ms(),
        "Search started"
    );
    let started = Instant::now();
    let result = conn.search(&fen, budget, grace).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(mv) => tracing::debug!(mv = %mv, elapsed_ms, "Search finished"),
        Err(e) if e.is_fatal() => {
            tracing::error!(
                error = %e,
                elapsed_ms,
                "Search engine failed; it will not be restarted"
            );
            *state.write() = EngineState::Dead;
            if let Some(conn) = slot.take() {
                conn.abandon();
            }
        }
        Err(e) => tracing::warn!(error = %e, elapsed_ms, "Search failed"),
    }

    result
}

#[async_trait]
impl MoveSearch for UciEngine {
    async fn propose_move(&self, fen: &str, budget: SearchBudget) -> Result<String, SearchFailure> {
        if self.state() != EngineState::Running {
            return Err(self.unavailable());
        }

        let slot = Arc::clone(&self.connection).lock_owned().await;
        // the engine may have died while we were queued
        if slot.is_none() {
            return Err(self.unavailable());
        }

        let search = tokio::spawn(run_search(
            slot,
            Arc::clone(&self.state),
            fen.to_string(),
            budget,
            self.grace,
        ));
        match search.await {
            Ok(result) => result,
            Err(e) => {
                // the task panicked mid-exchange, so the stream is unusable
                tracing::error!(error = %e, "Search task failed");
                *self.state.write() = EngineState::Dead;
                Err(SearchFailure::Closed)
            }
        }
    }
}
