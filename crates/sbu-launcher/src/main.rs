//! Simple Browser launcher.

use std::io::{self, IsTerminal};

use anyhow::Context;
use clap::{ColorChoice, Parser};
use sbu_launcher::cli::{Cli, LogFormatArg, LogLevelArg};
use sbu_launcher::logging::{LogConfig, LogFormat, init_logging};
use sbu_launcher::progress::ConsoleProgress;
use sbu_updater::{LaunchError, LaunchOutcome, Launcher, SystemProcessControl, UpdateCheck};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => report(&error),
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;
    let config = cli.load_config(&cwd)?;
    tracing::debug!("Using configuration {:?}", config);

    if cli.check_only {
        let check = Launcher::new(config, SystemProcessControl).check()?;
        print_check(&check);
        return Ok(());
    }

    let mut launcher = Launcher::new(config, SystemProcessControl)
        .with_progress(Box::new(ConsoleProgress::new()));
    match launcher.run()? {
        LaunchOutcome::Updated { from, to, .. } => {
            println!("Updating Simple Browser from {from} to {to}");
        }
        LaunchOutcome::Launched { version, .. } => {
            tracing::info!("Started Simple Browser {}", version);
        }
    }
    Ok(())
}

fn print_check(check: &UpdateCheck) {
    if check.update_available {
        println!(
            "Update available: {} -> {} ({})",
            check.current, check.latest, check.release.asset_url
        );
    } else {
        println!(
            "Up to date: installed {}, latest {}",
            check.current, check.latest
        );
    }
}

/// Prints the failure as one line and picks the exit code.
fn report(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<LaunchError>() {
        Some(launch_error) => {
            eprintln!(
                "error: {}: {} ({launch_error})",
                launch_error.step(),
                launch_error.user_message()
            );
            launch_error.exit_code()
        }
        None => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
