use crate::progress::{DotSink, ProgressReporter, ProgressSink, DEFAULT_TICK_INTERVAL};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("Failed to launch '{program}': {reason}")]
    SpawnFailure { program: String, reason: String },
    #[error("Command exited with status {code}")]
    NonZeroExit { code: i32 },
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Output is buffered and returned for parsing.
    Captured,
    /// Terminal stdin is connected and output is drained live. With
    /// `verbose` the lines are echoed, otherwise a progress ticker runs.
    Streaming { verbose: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub argv: Vec<String>,
    pub mode: OutputMode,
    pub timeout: Option<Duration>,
}

impl ExecutionRequest {
    pub fn new<I, S>(argv: I, mode: OutputMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            mode,
            timeout: None,
        }
    }

    pub fn captured<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(argv, OutputMode::Captured)
    }

    pub fn streaming<I, S>(argv: I, verbose: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(argv, OutputMode::Streaming { verbose })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub succeeded: bool,
    pub error: Option<ExecError>,
}

impl ExecutionResult {
    pub fn from_exit(exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        let succeeded = exit_code == 0;
        Self {
            exit_code,
            stdout,
            stderr,
            succeeded,
            error: (!succeeded).then_some(ExecError::NonZeroExit { code: exit_code }),
        }
    }

    pub fn spawn_failure(program: &str, reason: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            stdout: Vec::new(),
            stderr: Vec::new(),
            succeeded: false,
            error: Some(ExecError::SpawnFailure {
                program: program.to_string(),
                reason: reason.into(),
            }),
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Non-blank stdout lines with surrounding whitespace removed.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout_text()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_spawn_failure(&self) -> bool {
        matches!(self.error, Some(ExecError::SpawnFailure { .. }))
    }

    pub fn into_result(self) -> Result<Self, ExecError> {
        match self.error.clone() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

/// Runs one external command to completion.
///
/// Failures are reported in the returned result, never retried.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, request: &ExecutionRequest) -> ExecutionResult;
}

/// Runner backed by real child processes.
///
/// Arguments go straight to `execve` through the search path; nothing is
/// interpreted by a shell. Privilege escalation is the caller's job.
pub struct SystemRunner {
    sink: Arc<dyn ProgressSink>,
    tick_interval: Duration,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::with_progress(Arc::new(DotSink), DEFAULT_TICK_INTERVAL)
    }

    pub fn with_progress(sink: Arc<dyn ProgressSink>, tick_interval: Duration) -> Self {
        Self {
            sink,
            tick_interval,
        }
    }

    async fn run_captured(&self, program: &str, args: &[String], timeout: Option<Duration>) -> ExecutionResult {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(output) => output,
                Err(_) => return timed_out(limit, Vec::new(), Vec::new()),
            },
            None => cmd.output().await,
        };

        match output {
            Ok(output) => ExecutionResult::from_exit(
                output.status.code().unwrap_or(-1),
                output.stdout,
                output.stderr,
            ),
            Err(e) => ExecutionResult::spawn_failure(program, e.to_string()),
        }
    }

    async fn run_streaming(
        &self,
        program: &str,
        args: &[String],
        verbose: bool,
        timeout: Option<Duration>,
    ) -> ExecutionResult {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ExecutionResult::spawn_failure(program, e.to_string()),
        };

        let stdout_drain = child
            .stdout
            .take()
            .map(|out| tokio::spawn(drain(out, verbose.then(tokio::io::stdout))));
        let stderr_drain = child
            .stderr
            .take()
            .map(|err| tokio::spawn(drain(err, verbose.then(tokio::io::stderr))));

        let (done_tx, done_rx) = oneshot::channel();
        let reporter = (!verbose).then(|| {
            let reporter = ProgressReporter::new(self.sink.clone(), self.tick_interval);
            tokio::spawn(reporter.watch(done_rx))
        });

        let mut expired = None;
        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    let _ = child.start_kill();
                    expired = Some(limit);
                    child.wait().await
                }
            },
            None => child.wait().await,
        };

        let stdout = join_drain(stdout_drain).await;
        let stderr = join_drain(stderr_drain).await;

        let _ = done_tx.send(());
        if let Some(reporter) = reporter {
            let _ = reporter.await;
        }

        if let Some(limit) = expired {
            return timed_out(limit, stdout, stderr);
        }

        match status {
            Ok(status) => ExecutionResult::from_exit(status.code().unwrap_or(-1), stdout, stderr),
            Err(e) => {
                tracing::warn!("Failed waiting for {}: {}", program, e);
                ExecutionResult {
                    exit_code: -1,
                    stdout,
                    stderr,
                    succeeded: false,
                    error: Some(ExecError::NonZeroExit { code: -1 }),
                }
            }
        }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, request: &ExecutionRequest) -> ExecutionResult {
        let Some((program, args)) = request.argv.split_first() else {
            return ExecutionResult::spawn_failure("", "empty command");
        };

        tracing::info!("Executing command: {}", request.command_line());

        let result = match request.mode {
            OutputMode::Captured => self.run_captured(program, args, request.timeout).await,
            OutputMode::Streaming { verbose } => {
                self.run_streaming(program, args, verbose, request.timeout)
                    .await
            }
        };

        match &result.error {
            None => tracing::debug!("{} exited with 0", program),
            Some(e) => tracing::warn!("{}: {}", request.command_line(), e),
        }
        result
    }
}

fn timed_out(limit: Duration, stdout: Vec<u8>, stderr: Vec<u8>) -> ExecutionResult {
    ExecutionResult {
        exit_code: -1,
        stdout,
        stderr,
        succeeded: false,
        error: Some(ExecError::Timeout(limit)),
    }
}

/// Reads `source` to end of stream, keeping every byte and optionally
/// echoing each line to `echo`.
async fn drain<R, W>(source: R, mut echo: Option<W>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(source);
    let mut collected = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                if let Some(out) = echo.as_mut() {
                    let _ = out.write_all(&line).await;
                    let _ = out.flush().await;
                }
                collected.extend_from_slice(&line);
            }
            Err(e) => {
                tracing::debug!("Output stream closed early: {}", e);
                break;
            }
        }
    }

    collected
}

async fn join_drain(handle: Option<tokio::task::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match handle {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    }
}
