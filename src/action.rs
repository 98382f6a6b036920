//! Shell action execution.
//!
//! Actions are arbitrary shell strings from the configuration file; config
//! authors are trusted, so passing them to `sh -c` is the intended contract.
//! Execution is fire-and-forget: the child is handed to a reaper thread that
//! waits on it and ignores the result, so a slow or hung action never stalls
//! key handling.

use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

/// Spawn a shell action detached from the dispatch thread.
///
/// Only spawn failures are reported; a child that runs and exits non-zero is
/// not observed beyond a debug log.
pub fn spawn_detached(command: &str) -> Result<()> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| Error::ActionSpawnFailed {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

    let command = command.to_string();
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!(%command, %status, "action finished"),
        Err(e) => debug!(%command, error = %e, "failed waiting on action"),
    });

    Ok(())
}
