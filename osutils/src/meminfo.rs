use anyhow::{Context, Error};
use procfs::{Current, Meminfo};

/// Returns the total amount of swap configured on the system, in bytes.
///
/// Zero when no swap space is active.
pub fn swap_total() -> Result<u64, Error> {
    Ok(Meminfo::current()
        .context("Failed to read /proc/meminfo")?
        .swap_total)
}
