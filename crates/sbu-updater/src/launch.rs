//! Launch coordination.
//!
//! A run walks a fixed sequence of states:
//!
//! ```text
//! ReadLocalVersion -> ResolveRelease -> Compare -+-> TerminateAndUpdate -> Done
//!                                                +-> LaunchDirect -------> Done
//! ```
//!
//! Any step may end the run in `Failed`. Nothing is retried.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use crate::config::LauncherConfig;
use crate::download::{FileTransferer, ProgressSink};
use crate::error::{LaunchError, Result};
use crate::process::{ProcessControl, SpawnedProcess, TerminationOutcome};
use crate::release::{ReleaseInfo, ReleaseResolver};
use crate::version::Version;

/// States of a launcher run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchState {
    /// Reading the installed version.
    ReadLocalVersion,
    /// Querying the release endpoint.
    ResolveRelease,
    /// Comparing installed and released versions.
    Compare,
    /// Stopping the application, downloading and starting the updater.
    TerminateAndUpdate,
    /// Starting the installed application.
    LaunchDirect,
    /// Finished successfully.
    Done,
    /// Finished with an error in the named step.
    Failed(String),
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadLocalVersion => write!(f, "read local version"),
            Self::ResolveRelease => write!(f, "resolve release"),
            Self::Compare => write!(f, "compare versions"),
            Self::TerminateAndUpdate => write!(f, "terminate and update"),
            Self::LaunchDirect => write!(f, "launch application"),
            Self::Done => write!(f, "done"),
            Self::Failed(step) => write!(f, "failed: {step}"),
        }
    }
}

/// Result of comparing the installed version with the latest release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    /// Installed version.
    pub current: Version,
    /// Version of the latest release.
    pub latest: Version,
    /// The resolved release.
    pub release: ReleaseInfo,
    /// Whether `latest` is strictly newer than `current`.
    pub update_available: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A newer release was found and its updater was started.
    Updated {
        /// Installed version.
        from: Version,
        /// Released version.
        to: Version,
        /// Outcome of stopping the running application.
        termination: TerminationOutcome,
        /// Bytes downloaded.
        downloaded: u64,
        /// The started updater.
        updater: SpawnedProcess,
    },
    /// The installed version is current and the application was started.
    Launched {
        /// Installed version.
        version: Version,
        /// The started application.
        app: SpawnedProcess,
    },
}

/// Reads the first line of the version file.
pub fn read_local_version(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            LaunchError::Config(format!("version file {} not found", path.display()))
        }
        _ => LaunchError::Config(format!("failed to read {}: {e}", path.display())),
    })?;

    let line = content.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(LaunchError::Config(format!(
            "version file {} is empty",
            path.display()
        )));
    }

    Ok(line.to_string())
}

/// Drives one launcher run.
pub struct Launcher<P: ProcessControl> {
    config: LauncherConfig,
    processes: P,
    progress: Option<Box<dyn ProgressSink>>,
    states: Vec<LaunchState>,
}

impl<P: ProcessControl> Launcher<P> {
    /// Creates a launcher.
    pub fn new(config: LauncherConfig, processes: P) -> Self {
        Self {
            config,
            processes,
            progress: None,
            states: Vec::new(),
        }
    }

    /// Attaches a progress sink for the download.
    #[must_use]
    pub fn with_progress(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// States entered so far, in order.
    #[must_use]
    pub fn states(&self) -> &[LaunchState] {
        &self.states
    }

    /// The process controller.
    #[must_use]
    pub fn processes(&self) -> &P {
        &self.processes
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    fn enter(&mut self, state: LaunchState) {
        tracing::info!("Launcher state: {}", state);
        self.states.push(state);
    }

    fn fail(&mut self, err: &LaunchError) {
        self.enter(LaunchState::Failed(err.step().to_string()));
    }

    /// Runs the full sequence: check, then update or launch.
    pub fn run(&mut self) -> Result<LaunchOutcome> {
        let result = self.check_and_act();
        match &result {
            Ok(_) => self.enter(LaunchState::Done),
            Err(err) => self.fail(err),
        }
        result
    }

    /// Reads, resolves and compares without changing anything on the machine.
    pub fn check(&mut self) -> Result<UpdateCheck> {
        let result = self.resolve_and_compare();
        match &result {
            Ok(_) => self.enter(LaunchState::Done),
            Err(err) => self.fail(err),
        }
        result
    }

    fn check_and_act(&mut self) -> Result<LaunchOutcome> {
        let check = self.resolve_and_compare()?;

        if check.update_available {
            self.terminate_and_update(&check)
        } else {
            self.launch_direct(check.current)
        }
    }

    fn resolve_and_compare(&mut self) -> Result<UpdateCheck> {
        self.enter(LaunchState::ReadLocalVersion);
        let version_file = self.config.resolve(&self.config.version_file)?;
        let local = read_local_version(&version_file)?;
        let current: Version = local.parse().map_err(|_| {
            LaunchError::Config(format!(
                "version file {} contains '{local}', expected MAJOR.MINOR.PATCH",
                version_file.display()
            ))
        })?;
        tracing::debug!("Installed version {} from {}", current, version_file.display());

        self.enter(LaunchState::ResolveRelease);
        let repository = self.config.repository()?;
        let resolver = ReleaseResolver::new(&self.config)?;
        let release = resolver.resolve_latest(&repository)?;
        if !release.has_asset() {
            return Err(LaunchError::NoAssetFound(resolver.asset_name().to_string()));
        }

        self.enter(LaunchState::Compare);
        let latest: Version = release.tag.parse()?;
        let update_available = latest > current;

        if update_available {
            tracing::info!("Update available: {} -> {}", current, latest);
        } else {
            tracing::info!("Up to date (installed {}, latest {})", current, latest);
        }

        Ok(UpdateCheck {
            current,
            latest,
            release,
            update_available,
        })
    }

    fn terminate_and_update(&mut self, check: &UpdateCheck) -> Result<LaunchOutcome> {
        self.enter(LaunchState::TerminateAndUpdate);

        let process_name = self.config.app_process_name.clone();
        let termination = self.processes.terminate_by_name(&process_name);

        let updater_path = self.config.resolve(&self.config.updater_path)?;
        let transferer = FileTransferer::new(&self.config)?;
        let sink = self.progress.take();
        let result = transferer.download(&check.release.asset_url, &updater_path, |progress| {
            if let Some(sink) = &sink {
                sink.update(progress);
            }
        });
        if let Some(sink) = &sink {
            sink.finish();
        }
        let downloaded = result?;

        let updater = self.processes.spawn_detached(&updater_path)?;

        Ok(LaunchOutcome::Updated {
            from: check.current,
            to: check.latest,
            termination,
            downloaded,
            updater,
        })
    }

    fn launch_direct(&mut self, version: Version) -> Result<LaunchOutcome> {
        self.enter(LaunchState::LaunchDirect);

        let app_path = self.config.resolve(&self.config.app_executable)?;
        let app = self.processes.spawn_detached(&app_path)?;

        Ok(LaunchOutcome::Launched { version, app })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_local_version_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.ini");
        std::fs::write(&path, "1.4.2\r\nignored\n").unwrap();
        assert_eq!(read_local_version(&path).unwrap(), "1.4.2");
    }

    #[test]
    fn test_read_local_version_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_local_version(&dir.path().join("update.ini")).unwrap_err();
        assert!(matches!(err, LaunchError::Config(ref msg) if msg.contains("not found")));
    }

    #[test]
    fn test_read_local_version_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.ini");
        std::fs::write(&path, "   \n1.0.0\n").unwrap();
        let err = read_local_version(&path).unwrap_err();
        assert!(matches!(err, LaunchError::Config(ref msg) if msg.contains("empty")));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LaunchState::LaunchDirect.to_string(), "launch application");
        assert_eq!(
            LaunchState::Failed("find updater".to_string()).to_string(),
            "failed: find updater"
        );
    }
}
