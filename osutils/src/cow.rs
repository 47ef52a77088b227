//! Copy-on-write handling for files that must keep fixed physical extents.

use std::{fs::File, path::Path};

use anyhow::{Context, Error};
use log::debug;

use crate::dependencies::Dependency;

/// Prepares an empty file on a copy-on-write filesystem to back swap.
///
/// The file is created (or truncated) to zero length, then marked
/// `NOCOW` and uncompressed. Both attributes only take effect on empty
/// files, so this must run before any data is written.
pub fn prepare_nocow_file(path: impl AsRef<Path>) -> Result<(), Error> {
    let path = path.as_ref();

    debug!("Truncating '{}' to zero length", path.display());
    File::create(path)
        .and_then(|file| file.set_len(0))
        .with_context(|| format!("Failed to truncate '{}'", path.display()))?;

    Dependency::Chattr
        .cmd()
        .arg("+C")
        .arg(path)
        .run_and_check()
        .with_context(|| format!("Failed to disable copy-on-write on '{}'", path.display()))?;

    Dependency::Btrfs
        .cmd()
        .args(["property", "set"])
        .arg(path)
        .args(["compression", "none"])
        .run_and_check()
        .with_context(|| format!("Failed to disable compression on '{}'", path.display()))
}
