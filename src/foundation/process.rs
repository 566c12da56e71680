use std::io::Read as _;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::core::CancelToken;
use crate::foundation::error::ToolFailure;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `cmd` to completion under a wall-clock budget.
///
/// stdout is discarded and stderr is captured on a drain thread so a chatty child cannot block on
/// a full pipe. On timeout or cancellation the child is killed and the drain thread is detached:
/// a grandchild may still hold the pipe open and joining would wait on it.
pub(crate) fn run_tool(
    mut cmd: Command,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<(), ToolFailure> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    tracing::debug!(command = ?cmd, "spawning");

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ToolFailure::NotFound {
            program: program.clone(),
        },
        _ => ToolFailure::Spawn {
            program: program.clone(),
            message: e.to_string(),
        },
    })?;
    let drain = spawn_stderr_drain(&mut child);

    let status = wait_bounded(&mut child, &program, timeout, cancel)?;
    let stderr = drain
        .and_then(|h| h.join().ok())
        .and_then(Result::ok)
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    if !status.success() {
        return Err(ToolFailure::Exit {
            code: status.code(),
            program,
            stderr,
        });
    }
    if !stderr.is_empty() {
        tracing::trace!(%program, %stderr, "tool stderr");
    }
    Ok(())
}

fn spawn_stderr_drain(child: &mut Child) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    let mut stderr = child.stderr.take()?;
    Some(std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok(bytes)
    }))
}

fn wait_bounded(
    child: &mut Child,
    program: &str,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<ExitStatus, ToolFailure> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            // A terminal Ctrl-C reaches the child too, so it may exit before the token is seen.
            Ok(Some(_)) if cancel.is_cancelled() => return Err(ToolFailure::Interrupted),
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return Err(ToolFailure::Spawn {
                    program: program.to_string(),
                    message: format!("failed to wait: {e}"),
                });
            }
        }

        if cancel.is_cancelled() {
            kill(child);
            return Err(ToolFailure::Interrupted);
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            kill(child);
            return Err(ToolFailure::Timeout {
                program: program.to_string(),
                after: timeout,
            });
        }
        std::thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Return `true` when `program -version` runs and exits 0.
pub fn is_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
