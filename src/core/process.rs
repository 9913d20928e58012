//! External tool runner with timeout and cooperative cancellation.

use log::{debug, warn};
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::core::error::ScanError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDERR_TAIL_LINES: usize = 20;

/// Shared flag that aborts a run between frames and kills any running tool.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum ToolError {
    Spawn(std::io::Error),
    Io(std::io::Error),
    TimedOut(Duration),
    Cancelled,
}

impl ToolError {
    /// Maps a runner failure onto the pipeline taxonomy. `stage` builds the
    /// error for failures that belong to the calling stage (e.g. a missing binary).
    pub fn into_scan_error(self, tool: &str, stage: impl FnOnce(String) -> ScanError) -> ScanError {
        match self {
            ToolError::Spawn(e) => stage(format!("failed to launch {}: {}", tool, e)),
            ToolError::Io(e) => stage(format!("{} i/o error: {}", tool, e)),
            ToolError::TimedOut(after) => ScanError::Timeout {
                tool: tool.to_string(),
                after,
            },
            ToolError::Cancelled => ScanError::Cancelled,
        }
    }
}

#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Last non-empty stderr lines, used as the diagnostic for a failed run.
    pub fn stderr_tail(&self) -> String {
        let text = String::from_utf8_lossy(&self.stderr);
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].join("\n")
    }
}

pub struct ToolCommand {
    program: String,
    command: Command,
    stdin: Option<Vec<u8>>,
    timeout: Option<Duration>,
    cancel: Option<CancelFlag>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let program_ref = program.as_ref();
        Self {
            program: program_ref.to_string_lossy().into_owned(),
            command: Command::new(program_ref),
            stdin: None,
            timeout: None,
            cancel: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.command.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command.args(args);
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.command.env(key, value);
        self
    }

    pub fn stdin_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.stdin = Some(bytes);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cancel_flag(mut self, flag: Option<CancelFlag>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn run(mut self) -> Result<ToolOutput, ToolError> {
        debug!("⚙️ Running {} {:?}", self.program, self.command.get_args().collect::<Vec<_>>());

        let stdin_mode = if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        };

        let mut child = self
            .command
            .stdin(stdin_mode)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ToolError::Spawn)?;

        let stdin_writer = match (child.stdin.take(), self.stdin.take()) {
            (Some(mut pipe), Some(bytes)) => Some(thread::spawn(move || {
                // The tool may exit before reading everything; its status reports that.
                let _ = pipe.write_all(&bytes);
            })),
            _ => None,
        };
        let stdout_reader = child.stdout.take().map(spawn_collector);
        let stderr_reader = child.stderr.take().map(spawn_collector);

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait().map_err(ToolError::Io)? {
                break status;
            }
            if self.cancel.as_ref().map(|c| c.is_cancelled()).unwrap_or(false) {
                warn!("🛑 {} cancelled, killing child", self.program);
                kill_and_reap(&mut child);
                return Err(ToolError::Cancelled);
            }
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    warn!("⏱️ {} exceeded {:?}, killing child", self.program, limit);
                    kill_and_reap(&mut child);
                    return Err(ToolError::TimedOut(limit));
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        if let Some(handle) = stdin_writer {
            let _ = handle.join();
        }
        let stdout = join_collector(stdout_reader);
        let stderr = join_collector(stderr_reader);

        debug!(
            "⚙️ {} exited with {} after {:?}",
            self.program,
            status,
            started.elapsed()
        );

        Ok(ToolOutput {
            status,
            stdout,
            stderr,
        })
    }
}

fn spawn_collector(mut stream: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        buf
    })
}

fn join_collector(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
