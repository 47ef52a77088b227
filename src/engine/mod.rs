use std::path::PathBuf;

use log::{debug, info};
use serde::Serialize;

use osutils::{block_devices::RootPartition, dependencies::Dependency};
use swap_api::{
    error::{ExecutionEnvironmentMisconfigurationError, SwapError, SwapResultExt},
    ProvisionerConfig,
};
use sysdefs::filesystems::FilesystemType;

use crate::SwapSize;

pub mod host;

mod creator;
mod inspector;
mod remover;

#[cfg(test)]
pub(crate) mod testutils;

use host::SwapHost;

/// Binaries every provisioning run needs.
const REQUIRED_BINARIES: [Dependency; 6] = [
    Dependency::Dd,
    Dependency::Df,
    Dependency::Findmnt,
    Dependency::Mkswap,
    Dependency::Swapoff,
    Dependency::Swapon,
];

/// Extra binaries needed when the swap file lands on a copy-on-write
/// filesystem.
const COPY_ON_WRITE_BINARIES: [Dependency; 2] = [Dependency::Chattr, Dependency::Btrfs];

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SwapReport {
    pub swap_file: PathBuf,
    pub size_gib: u64,
    pub filesystem: FilesystemType,
    pub root_partition: RootPartition,
    /// Swap space disabled before creating the new one.
    pub replaced: Option<PathBuf>,
}

/// Replaces the active swap of the host with a swap file of the requested
/// size.
pub struct SwapProvisioner<H: SwapHost> {
    host: H,
    config: ProvisionerConfig,
}

impl<H: SwapHost> SwapProvisioner<H> {
    pub fn new(host: H, config: ProvisionerConfig) -> Result<Self, SwapError> {
        if !host.is_root() {
            return Err(SwapError::new(
                ExecutionEnvironmentMisconfigurationError::MissingRequiredPermissions,
            ));
        }
        host.require(&REQUIRED_BINARIES)?;

        Ok(Self { host, config })
    }

    /// Runs the inspection, removal, and creation phases in order.
    ///
    /// Nothing on the host changes when the inspection fails.
    pub fn provision(&self, size: SwapSize) -> Result<SwapReport, SwapError> {
        debug!("Provisioning with {:?}", self.config);

        let target = inspector::inspect(&self.host, &self.config, size)
            .message("Failed to inspect the root disk")?;

        let replaced = remover::remove_active_swap(&self.host);

        let filesystem = creator::create_swap(&self.host, &self.config, &target)
            .message("Failed to create the swap file")?;

        info!(
            "Swap file '{}' of {} is active",
            target.swap_file.display(),
            target.size
        );

        Ok(SwapReport {
            swap_file: target.swap_file,
            size_gib: target.size.gib(),
            filesystem,
            root_partition: target.root,
            replaced,
        })
    }
}
