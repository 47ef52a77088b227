use std::path::Path;

use anyhow::{Context, Error};

use crate::dependencies::Dependency;

/// Block size, in bytes, used when zero-filling files.
pub const ZERO_FILL_BLOCK_SIZE: u64 = 1024;

/// Writes `blocks` KiB of zeroes to `path`, flushing the data to stable
/// storage before returning.
pub fn zero_fill(path: impl AsRef<Path>, blocks: u64) -> Result<(), Error> {
    Dependency::Dd
        .cmd()
        .args(zero_fill_args(path.as_ref(), blocks))
        .run_and_check()
        .with_context(|| {
            format!(
                "Failed to write {blocks} blocks of zeroes to '{}'",
                path.as_ref().display()
            )
        })
}

fn zero_fill_args(path: &Path, blocks: u64) -> Vec<String> {
    vec![
        "if=/dev/zero".into(),
        format!("of={}", path.display()),
        format!("bs={ZERO_FILL_BLOCK_SIZE}"),
        format!("count={blocks}"),
        "conv=fsync".into(),
        "status=none".into(),
    ]
}
