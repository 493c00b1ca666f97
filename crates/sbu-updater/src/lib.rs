//! Update check and launch logic for Simple Browser.
//!
//! On every start the launcher reads the installed version, asks the GitHub
//! Releases API for the latest release, and then either starts the installed
//! application or stops it, downloads the release's updater and starts that
//! instead.
//!
//! # Overview
//!
//! - [`version`] compares `MAJOR.MINOR.PATCH` version strings
//! - [`release`] resolves the latest release and its updater asset
//! - [`download`] streams a file to disk with progress callbacks
//! - [`process`] terminates and starts processes behind a trait
//! - [`launch`] ties the steps together as a small state machine
//!
//! Everything is blocking. A run makes one metadata request and at most one
//! download, so there is nothing to gain from an async runtime.
//!
//! # Example
//!
//! ```no_run
//! use sbu_updater::{LaunchOutcome, Launcher, LauncherConfig, SystemProcessControl};
//!
//! fn start() -> sbu_updater::Result<()> {
//!     let config = LauncherConfig::default();
//!     let mut launcher = Launcher::new(config, SystemProcessControl);
//!
//!     match launcher.run()? {
//!         LaunchOutcome::Updated { from, to, .. } => println!("Updating {from} -> {to}"),
//!         LaunchOutcome::Launched { version, .. } => println!("Started {version}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod error;
pub mod version;

// GitHub API
pub mod github;

// Steps
pub mod download;
pub mod launch;
pub mod process;
pub mod release;

pub use config::{LauncherConfig, Repository};
pub use download::{FanOut, FileTransferer, NoProgress, ProgressSink, TransferProgress};
pub use error::{LaunchError, Result};
pub use launch::{LaunchOutcome, LaunchState, Launcher, UpdateCheck, read_local_version};
pub use process::{ProcessControl, SpawnedProcess, SystemProcessControl, TerminationOutcome};
pub use release::{ReleaseInfo, ReleaseResolver};
pub use version::{Version, is_newer};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
