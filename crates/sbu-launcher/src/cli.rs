//! CLI argument definitions for the launcher.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use sbu_updater::{LauncherConfig, Result};

#[derive(Parser)]
#[command(
    name = "sbu-launcher",
    version,
    about = "Simple Browser launcher - update if needed, then start",
    long_about = "Checks the latest GitHub release of Simple Browser.\n\n\
                  If it is newer than the installed version, the running browser is\n\
                  stopped and the release's updater is downloaded and started.\n\
                  Otherwise the installed browser is started."
)]
pub struct Cli {
    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// JSON config file (default: launcher.json in the working directory, if present).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Release repository as OWNER/REPO.
    #[arg(long = "repo", value_name = "OWNER/REPO")]
    pub repo: Option<String>,

    /// Name of the release asset to download.
    #[arg(long = "asset-name", value_name = "NAME")]
    pub asset_name: Option<String>,

    /// Application to start, also used as the process name to terminate.
    #[arg(long = "app", value_name = "PATH")]
    pub app: Option<PathBuf>,

    /// File whose first line is the installed version.
    #[arg(long = "version-file", value_name = "PATH")]
    pub version_file: Option<PathBuf>,

    /// Base URL of the release API.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Directory the application lives in (default: current directory).
    #[arg(long = "working-dir", value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Only report whether an update is available; change nothing.
    #[arg(long = "check-only")]
    pub check_only: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    ///
    /// `cwd` is used when `--working-dir` is not given.
    pub fn load_config(&self, cwd: &Path) -> Result<LauncherConfig> {
        let dir = match &self.working_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        };

        let mut config = LauncherConfig::load(self.config.as_deref(), &dir)?;
        config.working_dir = match config.working_dir.take() {
            _ if self.working_dir.is_some() => Some(dir),
            Some(file_dir) if file_dir.is_relative() => Some(cwd.join(file_dir)),
            Some(file_dir) => Some(file_dir),
            None => Some(dir),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Applies the flags that were given on top of `config`.
    pub fn apply_overrides(&self, config: &mut LauncherConfig) {
        if let Some(repo) = &self.repo {
            config.repository.clone_from(repo);
        }
        if let Some(asset_name) = &self.asset_name {
            config.asset_name.clone_from(asset_name);
        }
        if let Some(app) = &self.app {
            config.app_executable.clone_from(app);
            if let Some(name) = app.file_name() {
                config.app_process_name = name.to_string_lossy().into_owned();
            }
        }
        if let Some(version_file) = &self.version_file {
            config.version_file.clone_from(version_file);
        }
        if let Some(api_base_url) = &self.api_base_url {
            config.api_base_url.clone_from(api_base_url);
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
