use std::path::PathBuf;

use log::{debug, info};

use osutils::{files, swap::SwapType};
use swap_api::error::BestEffort;

use crate::engine::host::SwapHost;

/// Disables the most recently activated swap space and deletes it when it is
/// a file.
///
/// Every step is best-effort: a stale swap file must never prevent creating
/// the new one. Returns the swap space that was disabled, if any.
pub(super) fn remove_active_swap(host: &impl SwapHost) -> Option<PathBuf> {
    let total = host.swap_total().best_effort("read swap accounting")?;
    if total == 0 {
        debug!("No swap is active");
        return None;
    }

    let last = host
        .active_swaps()
        .best_effort("list active swap spaces")?
        .pop()?;
    let path = PathBuf::from(&last.name);

    info!(
        "Disabling existing swap '{}' ({} bytes, priority {})",
        path.display(),
        last.size,
        last.priority
    );
    host.swapoff(&path)
        .best_effort(&format!("disable swap on '{}'", path.display()));

    match last.swap_type {
        SwapType::File => {
            if files::remove_file_if_exists(&path)
                .best_effort(&format!("remove swap file '{}'", path.display()))
                == Some(true)
            {
                info!("Removed old swap file '{}'", path.display());
            }
        }
        _ => debug!(
            "'{}' is not a swap file, leaving it in place",
            path.display()
        ),
    }

    Some(path)
}
