//! Client for a UCI chess engine subprocess (Stockfish by default).
//!
//! One engine process is kept alive across queries instead of paying the
//! spawn and handshake cost per move. The process is started lazily on
//! first use and torn down whenever a query fails or times out, so the
//! next query begins with a clean handshake.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Wall-clock allowance on top of the requested think time before a query
/// is abandoned.
const REPLY_GRACE: Duration = Duration::from_secs(3);

/// Deadline for the initial `uci`/`isready` handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the engine subprocess or its wire protocol.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Failed to spawn the process or read/write its pipes.
    #[error("engine I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The engine sent something the protocol does not allow here.
    #[error("engine protocol violation: {0}")]
    Protocol(String),

    /// No reply arrived within the think budget plus grace.
    #[error("engine gave no reply within {0:?}")]
    Timeout(Duration),

    /// The engine process closed its pipes.
    #[error("engine process terminated unexpectedly")]
    Terminated,
}

/// Handle to a UCI engine. Cheap to share; queries serialize on an
/// internal lock because the wire protocol is strictly request/response.
pub struct Engine {
    path: PathBuf,
    proc: Mutex<Option<EngineProcess>>,
}

impl Engine {
    /// New handle for the engine binary at `path`. Nothing is spawned
    /// until the first query.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            proc: Mutex::new(None),
        }
    }

    /// Best move for the position `fen` under the given think budget,
    /// as a coordinate-notation string.
    ///
    /// The budget is passed to the engine via `go movetime`; the call
    /// itself is abandoned with [`EngineError::Timeout`] once budget
    /// plus [`REPLY_GRACE`] elapses.
    pub async fn best_move(&self, fen: &str, movetime: Duration) -> Result<String, EngineError> {
        let mut slot = self.proc.lock().await;
        if slot.is_none() {
            debug!("spawning engine process: {}", self.path.display());
            *slot = Some(EngineProcess::spawn(&self.path).await?);
        }
        let proc = slot.as_mut().ok_or(EngineError::Terminated)?;

        let deadline = movetime + REPLY_GRACE;
        let result = match timeout(deadline, proc.query(fen, movetime)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(deadline)),
        };

        // A failed or abandoned query leaves the wire state unknown;
        // discard the process so the next query respawns.
        if let Err(ref err) = result {
            warn!("engine query failed, discarding process: {err}");
            if let Some(mut dead) = slot.take() {
                let _ = dead.child.start_kill();
            }
        }
        result
    }

    /// Ask a running engine to exit cleanly. Errors are ignored; the
    /// process is killed on drop regardless.
    pub async fn shutdown(&self) {
        if let Some(mut proc) = self.proc.lock().await.take() {
            let _ = proc.send("quit").await;
        }
    }
}

struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl EngineProcess {
    async fn spawn(path: &Path) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child.stdin.take().ok_or(EngineError::Terminated)?;
        let stdout = child.stdout.take().ok_or(EngineError::Terminated)?;
        let mut proc = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        };
        timeout(HANDSHAKE_TIMEOUT, proc.handshake())
            .await
            .map_err(|_| EngineError::Timeout(HANDSHAKE_TIMEOUT))??;
        Ok(proc)
    }

    async fn handshake(&mut self) -> Result<(), EngineError> {
        self.send("uci").await?;
        self.read_until("uciok").await?;
        self.send("isready").await?;
        self.read_until("readyok").await?;
        Ok(())
    }

    async fn query(&mut self, fen: &str, movetime: Duration) -> Result<String, EngineError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", movetime.as_millis()))
            .await?;
        let line = self.read_until("bestmove").await?;
        parse_bestmove(&line)
    }

    async fn send(&mut self, line: &str) -> Result<(), EngineError> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Skip engine chatter (`id`, `option`, `info` lines) until a line
    /// starting with `token` arrives.
    async fn read_until(&mut self, token: &str) -> Result<String, EngineError> {
        loop {
            match self.stdout.next_line().await? {
                Some(line) if line.starts_with(token) => return Ok(line),
                Some(_) => continue,
                None => return Err(EngineError::Terminated),
            }
        }
    }
}

fn parse_bestmove(line: &str) -> Result<String, EngineError> {
    let mv = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| EngineError::Protocol(format!("malformed bestmove line: {line:?}")))?;
    if mv == "(none)" {
        return Err(EngineError::Protocol("engine found no move to play".into()));
    }
    Ok(mv.to_string())
}
