use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use log::{debug, error, info, warn};

use osutils::{
    files,
    tabfile::{self, TabFileEntry},
};
use swap_api::{
    constants::{ZRAM_SWAP_COMMENTED_DIRECTIVE, ZRAM_SWAP_DISABLED_DIRECTIVE},
    error::{ProvisioningError, ReportError, SwapError},
    ProvisionerConfig,
};
use sysdefs::filesystems::FilesystemType;

use crate::engine::{host::SwapHost, inspector::SwapTarget, COPY_ON_WRITE_BINARIES};

/// Permissions of the swap file: owner read/write only.
const SWAP_FILE_MODE: u32 = 0o600;

/// Progress of the swap file creation, used to undo a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Allocating,
    Formatting,
    Activating,
    Persisting,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Stage::Allocating => "allocating",
            Stage::Formatting => "formatting",
            Stage::Activating => "activating",
            Stage::Persisting => "persisting",
        })
    }
}

/// Allocates, formats and activates the swap file described by `target`,
/// then records it in the mount table.
///
/// Returns the type of the filesystem holding the swap file.
pub(super) fn create_swap(
    host: &impl SwapHost,
    config: &ProvisionerConfig,
    target: &SwapTarget,
) -> Result<FilesystemType, SwapError> {
    let fs_type = host
        .filesystem_type(&target.swap_dir)
        .structured(ProvisioningError::DetectFilesystem {
            path: target.swap_dir.display().to_string(),
        })?;
    debug!(
        "Swap directory '{}' is on {fs_type}",
        target.swap_dir.display()
    );
    if fs_type.is_copy_on_write() {
        host.require(&COPY_ON_WRITE_BINARIES)?;
    }

    let mut stage = Stage::Allocating;
    if let Err(e) = build_swap_file(host, config, target, &fs_type, &mut stage) {
        error!("Swap creation failed while {stage}");
        if !config.rollback_on_failure {
            warn!(
                "Rollback is disabled, '{}' is left behind",
                target.swap_file.display()
            );
            return Err(e);
        }
        return Err(rollback(host, target, stage, e));
    }

    if config.zram_config_path.exists() {
        info!("Disabling zram swap in '{}'", config.zram_config_path.display());
        files::replace_in_file(
            &config.zram_config_path,
            ZRAM_SWAP_COMMENTED_DIRECTIVE,
            ZRAM_SWAP_DISABLED_DIRECTIVE,
        )
        .structured(ProvisioningError::DisableZramSwap)?;
    }

    host.sync();
    if config.settle_seconds > 0 {
        debug!("Waiting {}s for swap accounting to settle", config.settle_seconds);
        host.settle(Duration::from_secs(config.settle_seconds));
    }

    Ok(fs_type)
}

fn build_swap_file(
    host: &impl SwapHost,
    config: &ProvisionerConfig,
    target: &SwapTarget,
    fs_type: &FilesystemType,
    stage: &mut Stage,
) -> Result<(), SwapError> {
    let swap_file = target.swap_file.as_path();

    *stage = Stage::Allocating;
    if fs_type.is_copy_on_write() {
        debug!("Disabling copy-on-write for '{}'", swap_file.display());
        host.prepare_nocow_file(swap_file)
            .structured(ProvisioningError::DisableCopyOnWrite)?;
    }

    info!(
        "Allocating {} swap file '{}'",
        target.size,
        swap_file.display()
    );
    host.zero_fill(swap_file, target.size.kib_blocks())
        .structured(ProvisioningError::AllocateSwapFile)?;
    files::set_mode(swap_file, SWAP_FILE_MODE).structured(ProvisioningError::SetPermissions)?;

    *stage = Stage::Formatting;
    host.mkswap(swap_file, &config.label)
        .structured(ProvisioningError::FormatSwapFile)?;

    *stage = Stage::Activating;
    host.swapon(swap_file)
        .structured(ProvisioningError::ActivateSwapFile)?;

    *stage = Stage::Persisting;
    info!(
        "Recording '{}' in '{}'",
        swap_file.display(),
        config.fstab_path.display()
    );
    tabfile::update_swap_entry(&config.fstab_path, &TabFileEntry::new_swap(swap_file))
        .structured(ProvisioningError::UpdateFstab)
}

/// Undoes a partial swap file creation that failed at `stage`.
fn rollback(
    host: &impl SwapHost,
    target: &SwapTarget,
    stage: Stage,
    mut error: SwapError,
) -> SwapError {
    let swap_file = target.swap_file.as_path();
    warn!("Removing partially created swap file '{}'", swap_file.display());

    if stage == Stage::Persisting {
        if let Err(e) = host.swapoff(swap_file) {
            error = error.secondary_error_context(e);
        }
    }

    if let Err(e) = files::remove_file_if_exists(swap_file) {
        error = error.secondary_error_context(e);
    }

    error
}
