//! Shared helpers for sources that shell out to system commands.

use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::SourceError;

/// Check if a command exists by running `which`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a command with a hard timeout and return its stdout as a string.
///
/// The command runs on a worker thread so a hung binary cannot stall the
/// sampling loop. On timeout the reading is abandoned for this tick (the
/// child is left to finish on its own) and the caller gets `Unavailable`.
pub fn run_command_timeout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, SourceError> {
    let (tx, rx) = mpsc::channel();
    let program_owned = program.to_string();
    let args_owned: Vec<String> = args.iter().map(|a| a.to_string()).collect();

    thread::spawn(move || {
        let result = Command::new(&program_owned).args(&args_owned).output();
        let _ = tx.send(result);
    });

    match rx.recv_timeout(timeout) {
        Ok(Ok(out)) if out.status.success() => {
            Ok(String::from_utf8_lossy(&out.stdout).into_owned())
        }
        Ok(Ok(out)) => Err(SourceError::Unavailable(format!(
            "{program} exited with {}",
            out.status
        ))),
        Ok(Err(e)) => Err(SourceError::Unavailable(format!(
            "failed to run {program}: {e}"
        ))),
        Err(_) => Err(SourceError::Unavailable(format!(
            "{program} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}
