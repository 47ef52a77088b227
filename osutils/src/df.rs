use std::path::Path;

use anyhow::{Context, Error};

use sysdefs::filesystems::FilesystemType;

use crate::dependencies::Dependency;

/// Returns the space available to unprivileged users on the filesystem
/// holding `path`, in whole GiB (rounded up by df, like `df -h` does).
pub fn available_space_gib(path: impl AsRef<Path>) -> Result<u64, Error> {
    let output = Dependency::Df
        .cmd()
        .arg(path.as_ref())
        .args(["-B", "1G", "--output=avail"])
        .output_and_check()
        .context("Failed to execute df")?;

    parse_df_available_space_output(&output)
}

/// Returns the type of the filesystem holding `path`.
pub fn filesystem_type(path: impl AsRef<Path>) -> Result<FilesystemType, Error> {
    let output = Dependency::Df
        .cmd()
        .arg(path.as_ref())
        .arg("--output=fstype")
        .output_and_check()
        .context("Failed to execute df")?;

    parse_df_fstype_output(&output)
}

fn second_line(output: &str) -> Result<&str, Error> {
    output
        .lines()
        .nth(1) // Skip the header line
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .context("Failed to access output from df")
}

fn parse_df_available_space_output(output: &str) -> Result<u64, Error> {
    let avail = second_line(output)?;
    avail
        .strip_suffix('G')
        .unwrap_or(avail)
        .parse::<u64>()
        .with_context(|| format!("Failed to parse available space '{avail}'"))
}

fn parse_df_fstype_output(output: &str) -> Result<FilesystemType, Error> {
    Ok(second_line(output)?.into())
}
