//! The GAP session manager.
//!
//! Owns the persistent GAP subprocess and implements the sentinel protocol
//! that turns its free-running stdout/stderr into a synchronous
//! request/response API. A single lock serializes callers: GAP has no
//! notion of concurrent requests, so exactly one command is in flight at a
//! time and everyone else queues.
//!
//! Recovery model: a timed-out command tears the process down and restarts
//! it before returning (the underlying read cannot be cancelled mid-flight,
//! so restart is the only reliable way to unstick the pipe); a process that
//! exits on its own is replaced lazily on the next call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::gap::filter;
use crate::gap::reader::{self, StreamEvent};
use crate::{AppError, Result};

/// End-of-response marker echoed by GAP after every command.
///
/// Known limitation: a command whose legitimate output contains this exact
/// line desynchronizes the protocol. There is no escape mechanism; the
/// marker is chosen to make accidental collision implausible.
pub const SENTINEL: &str = "__GAPDONE__";

/// GAP statement that prints [`SENTINEL`] on a line of its own.
///
/// The `\n` is escaped so that GAP, not this program, interprets it.
pub const SENTINEL_CMD: &str = "Print(\"__GAPDONE__\\n\");";

/// Arguments GAP is launched with. `-q` suppresses the startup banner.
const GAP_ARGS: &[&str] = &["-q"];

/// Graceful exit statement written on close before any forced kill.
const QUIT_CMD: &str = "QUIT;";

/// Timeout settings for one session manager.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// Default bound on the wait for each successive output line.
    pub command: Duration,
    /// Bound on the startup handshake (spawn to first sentinel).
    pub startup: Duration,
    /// Grace between the graceful `QUIT;` and a forced kill.
    pub shutdown_grace: Duration,
}

impl SessionTimeouts {
    /// Build from whole-second values, as carried by the configuration.
    #[must_use]
    pub const fn from_secs(command: u64, startup: u64, shutdown_grace: u64) -> Self {
        Self {
            command: Duration::from_secs(command),
            startup: Duration::from_secs(startup),
            shutdown_grace: Duration::from_secs(shutdown_grace),
        }
    }
}

/// Structured outcome of one `execute` or `reset` call.
///
/// `success` is false exactly when `error` is present. Recoverable protocol
/// failures — blocked commands, engine-reported errors, timeouts, unexpected
/// exits — all surface here rather than as `Err` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command completed without a detected error.
    pub success: bool,
    /// Accumulated stdout with the sentinel line stripped.
    pub output: String,
    /// Matched error region, or a timeout/termination/filter message.
    pub error: Option<String>,
}

impl CommandResult {
    /// Successful result carrying `output`.
    #[must_use]
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// Failed result carrying `output` and an error message.
    #[must_use]
    pub fn fail(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(error.into()),
        }
    }
}

/// One process generation: child, stdin, and both reader queues.
///
/// Replaced as a unit on every restart so a reader that has not yet
/// observed its stream closing can never deliver stale lines or end
/// markers into a fresh session's queues.
struct GapSession {
    child: Child,
    stdin: ChildStdin,
    stdout_rx: UnboundedReceiver<StreamEvent>,
    stderr_rx: UnboundedReceiver<StreamEvent>,
}

/// How the stdout receive loop for one command ended.
enum ReadOutcome {
    /// The sentinel line arrived; the command's output is complete.
    Complete,
    /// The stream closed before the sentinel.
    Terminated,
    /// No line arrived within the allotted interval.
    TimedOut,
}

/// Managed persistent GAP subprocess.
///
/// The process is started lazily on first use and restarted transparently
/// after timeouts and crashes; callers interact only through structured
/// [`CommandResult`] values.
pub struct GapRunner {
    executable: PathBuf,
    timeouts: SessionTimeouts,
    session: Mutex<Option<GapSession>>,
}

impl GapRunner {
    /// Create a manager for `executable`. Nothing is spawned until the
    /// first command runs.
    #[must_use]
    pub fn new(executable: PathBuf, timeouts: SessionTimeouts) -> Self {
        Self {
            executable,
            timeouts,
            session: Mutex::new(None),
        }
    }

    /// Path of the managed executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run one GAP command and wait for its complete output.
    ///
    /// The command text is written verbatim plus a trailing newline; no
    /// statement terminator is inserted, so multi-line control constructs
    /// pass through unmodified. `timeout` overrides the configured default
    /// and bounds the wait for each successive output line, not the whole
    /// response — a computation that keeps printing keeps its session.
    ///
    /// Blocked commands, engine-reported errors, timeouts, and unexpected
    /// process exits are all reported inside the returned [`CommandResult`].
    ///
    /// # Errors
    ///
    /// Returns an error only when a fresh GAP process cannot be brought up:
    /// spawn failure or a startup handshake that never completes.
    pub async fn execute(&self, code: &str, timeout: Option<Duration>) -> Result<CommandResult> {
        if let Some(pattern) = filter::contains_blocked(code) {
            debug!(pattern, "rejecting blocked command");
            return Ok(CommandResult::fail(
                "",
                format!(
                    "Blocked: command contains denied pattern {pattern:?}. \
                     Use the reset tool to restart the session."
                ),
            ));
        }

        let line_timeout = timeout.unwrap_or(self.timeouts.command);
        let mut guard = self.session.lock().await;

        // Take ownership of the generation for the duration of the call; it
        // is put back only on paths that leave the session usable.
        let mut session = match guard.take() {
            Some(mut live) => {
                if matches!(live.child.try_wait(), Ok(Some(_))) {
                    warn!("GAP process exited since the last command; restarting");
                    drop(live);
                    self.start_session().await?
                } else {
                    live
                }
            }
            None => self.start_session().await?,
        };

        if let Err(err) = write_line(&mut session.stdin, code).await {
            // A broken pipe here means the process died between commands;
            // same recovery as an end marker mid-read.
            warn!(%err, "failed to write command; dropping session");
            return Ok(CommandResult::fail("", "GAP process terminated unexpectedly"));
        }
        if let Err(err) = write_line(&mut session.stdin, SENTINEL_CMD).await {
            warn!(%err, "failed to write sentinel; dropping session");
            return Ok(CommandResult::fail("", "GAP process terminated unexpectedly"));
        }

        let mut lines: Vec<String> = Vec::new();
        let outcome = loop {
            match tokio::time::timeout(line_timeout, session.stdout_rx.recv()).await {
                Ok(Some(StreamEvent::Line(line))) => {
                    if line == SENTINEL {
                        break ReadOutcome::Complete;
                    }
                    lines.push(line);
                }
                Ok(Some(StreamEvent::Closed)) | Ok(None) => break ReadOutcome::Terminated,
                Err(_elapsed) => break ReadOutcome::TimedOut,
            }
        };

        match outcome {
            ReadOutcome::Terminated => {
                warn!("GAP stream closed before the sentinel arrived");
                Ok(CommandResult::fail("", "GAP process terminated unexpectedly"))
            }
            ReadOutcome::TimedOut => {
                warn!(
                    timeout_secs = line_timeout.as_secs(),
                    "GAP command timed out; restarting the process"
                );
                self.close_session(session).await;
                *guard = Some(self.start_session().await?);
                Ok(CommandResult::fail(
                    "",
                    format!("GAP did not respond within {}s", line_timeout.as_secs()),
                ))
            }
            ReadOutcome::Complete => {
                let stderr_text = drain_buffered(&mut session.stderr_rx);
                let output = lines.join("\n").trim().to_owned();
                let combined = if stderr_text.is_empty() {
                    output.clone()
                } else {
                    format!("{output}\n{stderr_text}")
                };
                let error = filter::find_error(&combined);
                *guard = Some(session);
                Ok(match error {
                    Some(region) => CommandResult::fail(output, region),
                    None => CommandResult::ok(output),
                })
            }
        }
    }

    /// Restart the session, discarding every variable and definition held
    /// inside the engine.
    ///
    /// # Errors
    ///
    /// Returns an error when the replacement process cannot be started.
    pub async fn reset(&self) -> Result<CommandResult> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            self.close_session(session).await;
        }
        *guard = Some(self.start_session().await?);
        info!("GAP session reset");
        Ok(CommandResult::ok("GAP session reset."))
    }

    /// Terminate the session if one is live. Safe to call at any time; the
    /// next `execute` starts a fresh process.
    pub async fn close(&self) {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            self.close_session(session).await;
        }
    }

    /// Spawn a fresh generation and complete the startup handshake.
    ///
    /// The handshake writes the sentinel-print statement and waits for the
    /// sentinel to come back, which both proves liveness and flushes any
    /// startup text out of the stdout queue before real traffic begins.
    /// There are no fixed delays: GAP load time varies with the machine and
    /// the installed package set.
    async fn start_session(&self) -> Result<GapSession> {
        info!(executable = %self.executable.display(), "starting GAP process");

        let mut child = Command::new(&self.executable)
            .args(GAP_ARGS)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| AppError::Session(format!("failed to spawn GAP: {err}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Session("failed to capture GAP stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Session("failed to capture GAP stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::Session("failed to capture GAP stderr".into()))?;

        let (stdout_tx, stdout_rx) = mpsc::unbounded_channel();
        let (stderr_tx, stderr_rx) = mpsc::unbounded_channel();
        reader::spawn_reader("stdout", stdout, stdout_tx);
        reader::spawn_reader("stderr", stderr, stderr_tx);

        let mut session = GapSession {
            child,
            stdin,
            stdout_rx,
            stderr_rx,
        };

        if let Err(err) = self.handshake(&mut session).await {
            // Kill the half-started process before surfacing the failure.
            session.child.kill().await.ok();
            return Err(err);
        }

        info!("GAP process ready");
        Ok(session)
    }

    /// Startup handshake: one sentinel round-trip bounded by the startup
    /// timeout. Lines ahead of the sentinel are discarded.
    async fn handshake(&self, session: &mut GapSession) -> Result<()> {
        write_line(&mut session.stdin, SENTINEL_CMD)
            .await
            .map_err(|err| AppError::Session(format!("failed to write startup handshake: {err}")))?;

        loop {
            match tokio::time::timeout(self.timeouts.startup, session.stdout_rx.recv()).await {
                Ok(Some(StreamEvent::Line(line))) => {
                    if line == SENTINEL {
                        return Ok(());
                    }
                    debug!(line = line.as_str(), "discarding pre-handshake output");
                }
                Ok(Some(StreamEvent::Closed)) | Ok(None) => {
                    return Err(AppError::Session(
                        "GAP exited during startup handshake".into(),
                    ));
                }
                Err(_elapsed) => {
                    return Err(AppError::Session(format!(
                        "GAP did not become ready within {}s",
                        self.timeouts.startup.as_secs()
                    )));
                }
            }
        }
    }

    /// Gracefully terminate one generation: `QUIT;`, a grace period, then a
    /// forced kill. Best-effort; never fails.
    async fn close_session(&self, mut session: GapSession) {
        if write_line(&mut session.stdin, QUIT_CMD).await.is_err() {
            debug!("GAP stdin already closed during shutdown");
        }

        match tokio::time::timeout(self.timeouts.shutdown_grace, session.child.wait()).await {
            Ok(Ok(status)) => info!(?status, "GAP process exited"),
            Ok(Err(err)) => warn!(%err, "error waiting for GAP process"),
            Err(_elapsed) => {
                warn!("GAP did not exit within the grace period; killing");
                if let Err(err) = session.child.kill().await {
                    warn!(%err, "failed to kill GAP process");
                }
            }
        }
    }
}

/// Write `text` plus a newline and flush.
async fn write_line(stdin: &mut ChildStdin, text: &str) -> std::io::Result<()> {
    stdin.write_all(text.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Pull everything currently buffered on a reader queue without waiting.
fn drain_buffered(rx: &mut UnboundedReceiver<StreamEvent>) -> String {
    let mut lines = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            StreamEvent::Line(line) => lines.push(line),
            StreamEvent::Closed => break,
        }
    }
    lines.join("\n")
}
