use std::process::ExitCode;

use anyhow::{Context, Error};
use clap::Parser;
use log::{debug, info, LevelFilter};

use armbian_swap::{app, cli::Cli, BackgroundLog, MultiLogger, OsHost, SwapHost};
use swap_api::ProvisionerConfig;

fn setup_logging(args: &Cli, config: Option<&ProvisionerConfig>) -> Result<(), Error> {
    let mut multilogger = MultiLogger::new()
        // Human readable output on stderr
        .with_logger(Box::new(
            env_logger::builder()
                .format_timestamp(None)
                .filter_level(args.verbosity)
                .build(),
        ))
        .with_target_filter("procfs", LevelFilter::Warn);

    // Only root may write the system log directory
    if OsHost.is_root() {
        if let Some(path) = config.and_then(|c| c.background_log_path.as_ref()) {
            multilogger.add_logger(BackgroundLog::new(path).into_logger());
        }
    }

    multilogger.init().context("Logger already registered")
}

fn main() -> ExitCode {
    let args = Cli::parse();

    // The background log location comes from the configuration, so it is
    // loaded before logging is up and reported right after.
    let (config_path, required) = args.config_path();
    let config = ProvisionerConfig::load(&config_path, required);

    if let Err(e) = setup_logging(&args, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::from(1);
    }

    if config.is_ok() {
        if config_path.exists() {
            info!("Loaded configuration from '{}'", config_path.display());
        } else {
            debug!(
                "No configuration at '{}', using defaults",
                config_path.display()
            );
        }
    }

    let res = app::run(&args, OsHost, config);
    ExitCode::from(app::exit_status(&res))
}
