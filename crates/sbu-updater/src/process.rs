//! Process control: terminate the running application and start programs.
//!
//! Both operations are fire-and-forget at the OS level. The launcher never
//! waits for a terminated process to exit, nor for a spawned process to
//! finish, but the outcome of each call is returned so callers and tests can
//! see what happened.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{LaunchError, Result};

/// Result of a best-effort termination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The OS accepted the termination request.
    Terminated,
    /// No process with that name was running.
    NotRunning,
    /// The request could not be carried out.
    Failed(String),
}

/// A process started without waiting for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnedProcess {
    /// Program that was started.
    pub program: PathBuf,
    /// OS process id.
    pub pid: u32,
}

/// Operations the launcher needs from the operating system.
pub trait ProcessControl {
    /// Asks the OS to terminate every process named `name`. Never fails the run.
    fn terminate_by_name(&mut self, name: &str) -> TerminationOutcome;

    /// Starts `program` with no arguments and returns without waiting.
    fn spawn_detached(&mut self, program: &Path) -> Result<SpawnedProcess>;
}

/// [`ProcessControl`] backed by the real operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessControl;

impl ProcessControl for SystemProcessControl {
    fn terminate_by_name(&mut self, name: &str) -> TerminationOutcome {
        tracing::info!("Requesting termination of {}", name);

        let output = terminate_command(name)
            .stdin(Stdio::null())
            .output();

        let outcome = match output {
            Ok(output) if output.status.success() => TerminationOutcome::Terminated,
            Ok(output) if output.status.code() == Some(NOT_RUNNING_EXIT_CODE) => {
                TerminationOutcome::NotRunning
            }
            Ok(output) => TerminationOutcome::Failed(format!(
                "{} ({})",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            Err(e) => TerminationOutcome::Failed(e.to_string()),
        };

        match &outcome {
            TerminationOutcome::Failed(reason) => {
                tracing::warn!("Could not terminate {}: {}", name, reason);
            }
            other => tracing::debug!("Termination of {}: {:?}", name, other),
        }

        outcome
    }

    fn spawn_detached(&mut self, program: &Path) -> Result<SpawnedProcess> {
        tracing::info!("Starting {}", program.display());

        let spawn_error = |e: std::io::Error| LaunchError::Spawn {
            program: program.display().to_string(),
            reason: e.to_string(),
        };

        // The child runs in the program's directory, so a relative program
        // path would be looked up from there.
        let absolute = std::path::absolute(program).map_err(spawn_error)?;
        let mut command = Command::new(&absolute);
        if let Some(dir) = absolute.parent() {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(spawn_error)?;

        let pid = child.id();
        tracing::debug!("Started {} with pid {}", program.display(), pid);

        // Dropping the handle leaves the child running.
        Ok(SpawnedProcess {
            program: program.to_path_buf(),
            pid,
        })
    }
}

/// `taskkill` exits with 128 when no matching process exists.
#[cfg(windows)]
const NOT_RUNNING_EXIT_CODE: i32 = 128;

/// `pkill` exits with 1 when no process matched.
#[cfg(not(windows))]
const NOT_RUNNING_EXIT_CODE: i32 = 1;

#[cfg(windows)]
fn terminate_command(name: &str) -> Command {
    let mut command = Command::new("taskkill");
    command.args(["/F", "/IM", name]);
    command
}

#[cfg(not(windows))]
fn terminate_command(name: &str) -> Command {
    let mut command = Command::new("pkill");
    command.args(["-x", name]);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = SystemProcessControl.spawn_detached(&missing).unwrap_err();
        match err {
            LaunchError::Spawn { program, .. } => assert!(program.ends_with("does-not-exist")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_runs_program_from_its_own_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join("app");
        std::fs::create_dir(&app_dir).unwrap();
        let script = app_dir.join("SimpleBrowser");
        std::fs::write(&script, "#!/bin/sh\npwd > started\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let spawned = SystemProcessControl.spawn_detached(&script).unwrap();
        assert_eq!(spawned.program, script);
        assert!(spawned.pid > 0);

        let marker = app_dir.join("started");
        for _ in 0..100 {
            if std::fs::read_to_string(&marker).is_ok_and(|s| !s.trim().is_empty()) {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        let started_in = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(
            Path::new(started_in.trim()).canonicalize().unwrap(),
            app_dir.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_terminate_unknown_process_is_not_fatal() {
        let outcome = SystemProcessControl.terminate_by_name("sbu-no-such-process-42");
        assert_ne!(outcome, TerminationOutcome::Terminated);
    }
}
