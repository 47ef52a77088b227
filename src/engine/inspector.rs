use std::path::PathBuf;

use log::{debug, info};

use osutils::{block_devices::RootPartition, files};
use swap_api::{
    constants::SECONDARY_PARTITION_NUMBER,
    error::{ProvisioningError, ReportError, SwapError, UnsupportedConfigurationError},
    ProvisionerConfig,
};

use crate::{engine::host::SwapHost, SwapSize};

/// Where the swap file goes and how big it will be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapTarget {
    pub root: RootPartition,
    pub swap_dir: PathBuf,
    pub swap_file: PathBuf,
    pub size: SwapSize,
}

/// Locates the disk behind `/`, picks the swap directory and checks that it
/// has room for `size`.
///
/// Only the swap directory is created, and only once the space check passed.
pub(super) fn inspect(
    host: &impl SwapHost,
    config: &ProvisionerConfig,
    size: SwapSize,
) -> Result<SwapTarget, SwapError> {
    let source = host
        .root_source()
        .structured(UnsupportedConfigurationError::RootDeviceNotFound)?
        .structured(UnsupportedConfigurationError::RootDeviceNotFound)?;

    let root = RootPartition::parse(&source).structured(
        UnsupportedConfigurationError::UnrecognizedDevice {
            device: source.display().to_string(),
        },
    )?;
    debug!("Root filesystem is on {root}");

    // Prefer the data partition next to root when it is mounted.
    let candidate = config
        .mount_prefix
        .join(root.sibling(SECONDARY_PARTITION_NUMBER));
    let base_path = if candidate.is_dir() {
        candidate
    } else {
        debug!(
            "'{}' is not mounted, falling back to '{}'",
            candidate.display(),
            config.default_base_path.display()
        );
        config.default_base_path.clone()
    };

    let available_gib = host.available_space_gib(&base_path).structured(
        UnsupportedConfigurationError::AvailableSpace {
            path: base_path.display().to_string(),
        },
    )?;
    info!(
        "Requested {size} of swap, {available_gib} GiB available on '{}'",
        base_path.display()
    );

    if size.gib() > available_gib {
        return Err(SwapError::new(
            UnsupportedConfigurationError::InsufficientSpace {
                requested: size.gib(),
                available: available_gib,
            },
        ));
    }

    let swap_dir = base_path.join(&config.swap_dir_name);
    if files::create_dirs(&swap_dir).structured(ProvisioningError::CreateSwapDirectory {
        path: swap_dir.display().to_string(),
    })? {
        debug!("Created swap directory '{}'", swap_dir.display());
        host.sync();
    }

    Ok(SwapTarget {
        root,
        swap_file: swap_dir.join(&config.swap_file_name),
        swap_dir,
        size,
    })
}
