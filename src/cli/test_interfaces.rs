//! Test harness I/O boundary interfaces
//!
//! This module defines trait-based abstractions for the two harness operations that touch the outside world:
//! - Fixture discovery (filesystem scan)
//! - Solution execution (child process invocation + output capture)
//!
//! The harness loop in `test_runner.rs` only talks to these traits, so tests can substitute an in-process
//! executor and exercise staging and cleanup without compiling a real solution.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use infoarena_core::{CoreError, FixtureCase, discover_fixtures};
use miette::Diagnostic;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::runtime::Runtime;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Errors that abort a harness run
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("fixture discovery failed")]
    #[diagnostic(code(infoarena::discovery))]
    Discovery(#[source] CoreError),

    #[error("could not find the executable for '{problem}' in '{}'", dir.display())]
    #[diagnostic(
        code(infoarena::executable_not_found),
        help("build the solution first (for example with `make`); expected `{problem}` or a `*.exe` file")
    )]
    ExecutableNotFound { problem: String, dir: PathBuf },

    #[error("failed to copy executable to '{}'", path.display())]
    #[diagnostic(code(infoarena::stage_executable))]
    StageExecutable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stage fixture input at '{}'", path.display())]
    #[diagnostic(code(infoarena::stage_input))]
    StageInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove staged file '{}'", path.display())]
    #[diagnostic(code(infoarena::cleanup))]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start '{}'", path.display())]
    #[diagnostic(code(infoarena::spawn))]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for '{}'", path.display())]
    #[diagnostic(code(infoarena::wait))]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid test directory name '{name}': {reason}")]
    #[diagnostic(
        code(infoarena::invalid_test_dir),
        help("pass a single directory name inside the solution directory, such as `test`")
    )]
    InvalidTestDir { name: String, reason: String },

    #[error("failed to start the process runtime")]
    #[diagnostic(code(infoarena::runtime))]
    Runtime(#[source] std::io::Error),

    #[error("run interrupted")]
    #[diagnostic(code(infoarena::interrupted))]
    Interrupted,
}

// ============================================================================
// Interruption
// ============================================================================

/// Shared flag raised when the user asks the run to stop.
///
/// Raising it wakes a solution currently being waited on; a request that arrives between fixtures is kept and stops
/// the next execution before it starts.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    raised: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide interrupt raised by Ctrl-C.
    ///
    /// The signal handler is installed on first use. If it cannot be installed, Ctrl-C keeps its default behaviour
    /// and the returned interrupt is never raised.
    pub fn ctrl_c() -> Interrupt {
        static CTRL_C: OnceLock<Interrupt> = OnceLock::new();
        CTRL_C
            .get_or_init(|| {
                let interrupt = Interrupt::new();
                let handler = interrupt.clone();
                if let Err(e) = ctrlc::set_handler(move || handler.raise()) {
                    tracing::warn!(error = %e, "failed to install Ctrl-C handler");
                }
                interrupt
            })
            .clone()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
        // Stores a permit when nobody is waiting yet
        self.notify.notify_one();
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    async fn raised(&self) {
        if self.is_raised() {
            return;
        }
        self.notify.notified().await;
    }
}

// ============================================================================
// Fixture Discovery Interface
// ============================================================================

/// Find the fixture pairs a run should execute.
pub trait TestDiscovery {
    fn discover(&self, test_dir: &Path) -> Result<Vec<FixtureCase>, HarnessError>;
}

// ============================================================================
// Solution Executor Interface
// ============================================================================

/// What happened when the solution ran once.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    /// Exit code, `None` if the process was terminated by a signal or killed on timeout
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Run the staged solution once, in `working_dir`, and wait for it to finish.
///
/// The solution reads and writes the staged files itself; only its exit status and console output are returned.
pub trait TestExecutor {
    fn execute(
        &self,
        executable: &Path,
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ExecutionOutcome, HarnessError>;
}

// ============================================================================
// Default Implementations
// ============================================================================

/// Filesystem-based fixture discovery.
pub struct DefaultTestDiscovery;

impl TestDiscovery for DefaultTestDiscovery {
    fn discover(&self, test_dir: &Path) -> Result<Vec<FixtureCase>, HarnessError> {
        discover_fixtures(test_dir).map_err(HarnessError::Discovery)
    }
}

/// Child-process execution with captured output.
///
/// Each solution runs on a single-threaded tokio runtime owned by the executor. The wait is bounded by the optional
/// time limit and by the interrupt; in both cases the child is killed and reaped before `execute` returns.
pub struct DefaultTestExecutor {
    runtime: Runtime,
    interrupt: Interrupt,
}

impl DefaultTestExecutor {
    pub fn new(interrupt: Interrupt) -> Result<Self, HarnessError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(HarnessError::Runtime)?;
        Ok(Self { runtime, interrupt })
    }

    async fn run(
        &self,
        executable: &Path,
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ExecutionOutcome, HarnessError> {
        if self.interrupt.is_raised() {
            return Err(HarnessError::Interrupted);
        }

        let start = Instant::now();
        let mut child = Command::new(executable)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                path: executable.to_path_buf(),
                source,
            })?;

        let stdout_task = read_pipe(child.stdout.take());
        let stderr_task = read_pipe(child.stderr.take());

        let waited = tokio::select! {
            waited = wait_with_limit(&mut child, timeout) => waited.map_err(|source| HarnessError::Wait {
                path: executable.to_path_buf(),
                source,
            })?,
            () = self.interrupt.raised() => Waited::Interrupted,
        };

        let status = match waited {
            Waited::Exited(status) => status,
            Waited::TimedOut => {
                stop(&mut child, executable, [stdout_task, stderr_task]).await;
                return Ok(ExecutionOutcome {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                    duration: start.elapsed(),
                });
            }
            Waited::Interrupted => {
                stop(&mut child, executable, [stdout_task, stderr_task]).await;
                return Err(HarnessError::Interrupted);
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        Ok(ExecutionOutcome {
            exit_code: status.code(),
            stdout,
            stderr,
            timed_out: false,
            duration: start.elapsed(),
        })
    }
}

impl TestExecutor for DefaultTestExecutor {
    fn execute(
        &self,
        executable: &Path,
        working_dir: &Path,
        timeout: Option<Duration>,
    ) -> Result<ExecutionOutcome, HarnessError> {
        self.runtime.block_on(self.run(executable, working_dir, timeout))
    }
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

async fn wait_with_limit(child: &mut Child, limit: Option<Duration>) -> std::io::Result<Waited> {
    let Some(limit) = limit else {
        return child.wait().await.map(Waited::Exited);
    };
    match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => status.map(Waited::Exited),
        Err(_) => Ok(Waited::TimedOut),
    }
}

/// Kill and reap `child`, dropping whatever its pipes still hold.
async fn stop(child: &mut Child, executable: &Path, readers: [JoinHandle<String>; 2]) {
    // The child may exit between the deadline and the kill; `kill` reaps it either way.
    if let Err(e) = child.kill().await {
        tracing::warn!(path = %executable.display(), error = %e, "failed to kill solution");
    }
    for reader in readers {
        reader.abort();
    }
}

fn read_pipe<R: AsyncRead + Unpin + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
