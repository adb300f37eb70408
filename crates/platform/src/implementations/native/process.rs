//! Tokio-backed process execution
//!
//! The child runs in its own process group on Unix so that a timeout or
//! cancellation can reclaim every process the build tool started, not just
//! the direct child.

use async_trait::async_trait;
use ntask_errors::{Error, PlatformError};
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::process::{split_command_line, ProcessInfo, ProcessOutcome, ProcessRunner};

/// How long to keep reading pipes after the process is gone
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Production [`ProcessRunner`] spawning real child processes
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    drain_timeout: Duration,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            drain_timeout: OUTPUT_DRAIN_TIMEOUT,
        }
    }

    /// Bound the time spent collecting output once the process has exited
    #[must_use]
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

enum Completion {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Output collected by a background reader, readable even if the reader is aborted
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let sink = Arc::clone(&buffer);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => sink
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .extend_from_slice(&chunk[..n]),
                        Err(err) => {
                            debug!(error = %err, "output pipe read failed");
                            break;
                        }
                    }
                }
            })
        });
        Self { buffer, handle }
    }

    async fn finish(mut self, drain_timeout: Duration) -> String {
        if let Some(handle) = self.handle.take() {
            let abort = handle.abort_handle();
            if tokio::time::timeout(drain_timeout, handle).await.is_err() {
                debug!("output still open after process exit; keeping what was read");
                abort.abort();
            }
        }
        let bytes = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn spawn_error(program: &str, err: &std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::NotFound {
        PlatformError::CommandNotFound {
            command: program.to_string(),
        }
        .into()
    } else {
        PlatformError::ProcessExecutionFailed {
            command: program.to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

/// Kill the child and everything in its process group, then reap it
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pgid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(err) => warn!(pid = pgid, error = %err, "failed to kill process group"),
            }
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(err) = child.kill().await {
        warn!(error = %err, "failed to kill build process");
    }
}

#[async_trait]
impl ProcessRunner for ProcessExecutor {
    async fn execute(
        &self,
        info: ProcessInfo,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, Error> {
        let working_dir = info.working_dir();
        match tokio::fs::metadata(working_dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(PlatformError::WorkingDirectoryNotFound {
                    path: working_dir.display().to_string(),
                }
                .into())
            }
        }

        let args = split_command_line(info.arguments());
        let mut command = Command::new(info.program());
        command
            .args(&args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            command.process_group(0);
        }

        let started = Instant::now();
        let mut child = command
            .spawn()
            .map_err(|e| spawn_error(info.program(), &e))?;
        let pid = child.id();

        debug!(
            program = info.program(),
            arguments = info.arguments(),
            working_dir = %working_dir.display(),
            pid = ?pid,
            timeout_ms = ?info.timeout().map(|t| t.as_millis()),
            "spawned build process"
        );

        let stdout = Capture::spawn(child.stdout.take());
        let stderr = Capture::spawn(child.stderr.take());

        let deadline = async {
            match info.timeout() {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending::<()>().await,
            }
        };

        let completion = tokio::select! {
            status = child.wait() => Completion::Exited(status.map_err(|e| {
                PlatformError::ProcessExecutionFailed {
                    command: info.program().to_string(),
                    message: e.to_string(),
                }
            })?),
            () = deadline => Completion::TimedOut,
            () = cancel.cancelled() => Completion::Cancelled,
        };

        let (status, timed_out) = match completion {
            Completion::Exited(status) => (Some(status), false),
            Completion::TimedOut => {
                warn!(
                    program = info.program(),
                    pid = ?pid,
                    timeout_ms = ?info.timeout().map(|t| t.as_millis()),
                    "build process timed out; killing"
                );
                terminate(&mut child, pid).await;
                (child.wait().await.ok(), true)
            }
            Completion::Cancelled => {
                info!(program = info.program(), pid = ?pid, "cancellation requested; killing build process");
                terminate(&mut child, pid).await;
                return Err(Error::Cancelled);
            }
        };

        let outcome = ProcessOutcome {
            stdout: stdout.finish(self.drain_timeout).await,
            stderr: stderr.finish(self.drain_timeout).await,
            exit_code: status.and_then(|s| s.code()),
            elapsed: started.elapsed(),
            timed_out,
        };

        info!(
            program = info.program(),
            exit_code = ?outcome.exit_code,
            timed_out = outcome.timed_out,
            elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            "build process finished"
        );

        Ok(outcome)
    }
}
