//! Module for interacting with the `findmnt` command.
//!
//! `findmnt --json` reads `/proc/self/mountinfo` and prints the mount that
//! backs a given path. Only the columns needed to locate the root partition
//! are queried.

use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use serde::Deserialize;

use crate::dependencies::Dependency;

/// Comma-separated list of columns passed to `findmnt --json -o`.
pub const FINDMNT_COLUMNS: &str = "source";

/// Represents the output of `findmnt --json` as a Rust structure.
#[derive(Debug, Deserialize)]
pub struct FindMnt {
    pub filesystems: Vec<MountpointMetadata>,
}

/// A filesystem entry from `findmnt --json` with the columns defined in
/// `FINDMNT_COLUMNS`.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub struct MountpointMetadata {
    /// Source device.
    ///
    /// Optional because some mounts (e.g. overlays inside containers) have no
    /// source.
    pub source: Option<PathBuf>,
}

impl FindMnt {
    /// Runs `findmnt --json` for the mount point `target`.
    pub fn run_for(target: impl AsRef<Path>) -> Result<Self, Error> {
        let output = Dependency::Findmnt
            .cmd()
            .arg("--json")
            .args(["--output", FINDMNT_COLUMNS])
            .arg("--mountpoint")
            .arg(target.as_ref())
            .output_and_check()
            .context("Failed to execute findmnt")?;

        Self::from_json(&output)
    }

    /// Parses the JSON output of `findmnt`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).context("Failed to parse findmnt output")
    }

    /// Returns the source device of the first filesystem, if it has one.
    pub fn source(&self) -> Option<&Path> {
        self.filesystems
            .first()
            .and_then(|fs| fs.source.as_deref())
    }
}

/// Returns the block device that backs the filesystem mounted at `target`.
pub fn source_device(target: impl AsRef<Path>) -> Result<Option<PathBuf>, Error> {
    Ok(FindMnt::run_for(target)?.source().map(Path::to_path_buf))
}
