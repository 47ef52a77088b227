use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use swap_api::constants::DEFAULT_CONFIG_PATH;

use crate::VERSION;

/// Replaces the active swap with a swap file on the root disk.
#[derive(Parser, Debug)]
#[clap(version = VERSION)]
pub struct Cli {
    /// Swap size in GiB. Fractions are truncated; invalid values mean 1
    #[clap(index = 1)]
    pub size: Option<String>,

    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(short, long, default_value_t = LevelFilter::Debug)]
    pub verbosity: LevelFilter,

    /// Provisioner configuration
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Path to save the provisioning report
    #[clap(short, long)]
    pub status: Option<PathBuf>,

    /// Path to save an eventual fatal error
    #[clap(short, long)]
    pub error: Option<PathBuf>,
}

impl Cli {
    /// Configuration file to load, and whether it has to exist.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }
}
