use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::Error;
use nix::unistd::Uid;

use osutils::{
    cow, dd,
    dependencies::{Dependency, DependencyResultExt},
    df, findmnt, meminfo,
    swap::{self, SwapSpace},
};
use swap_api::{constants::ROOT_MOUNT_POINT_PATH, SwapError};
use sysdefs::filesystems::FilesystemType;

/// Operating system services used to provision swap.
///
/// Plain file manipulation (directories, permissions, the mount table) is
/// done directly on paths; everything that asks the kernel or runs a system
/// binary goes through this trait.
pub trait SwapHost {
    /// Whether the process runs with an effective UID of 0.
    fn is_root(&self) -> bool;

    /// Fails with a missing binary error unless every one of `binaries` can
    /// be found.
    fn require(&self, binaries: &[Dependency]) -> Result<(), SwapError>;

    /// Block device backing the root filesystem, if it has one.
    fn root_source(&self) -> Result<Option<PathBuf>, Error>;

    /// Free space on the filesystem holding `path`, in whole GiB.
    fn available_space_gib(&self, path: &Path) -> Result<u64, Error>;

    fn filesystem_type(&self, path: &Path) -> Result<FilesystemType, Error>;

    /// Total active swap in bytes.
    fn swap_total(&self) -> Result<u64, Error>;

    /// Active swap spaces, most recently activated last.
    fn active_swaps(&self) -> Result<Vec<SwapSpace>, Error>;

    fn swapoff(&self, path: &Path) -> Result<(), Error>;

    /// Creates `path` empty with copy-on-write and compression disabled.
    fn prepare_nocow_file(&self, path: &Path) -> Result<(), Error>;

    /// Writes `blocks` KiB of zeroes to `path` and flushes them.
    fn zero_fill(&self, path: &Path, blocks: u64) -> Result<(), Error>;

    fn mkswap(&self, path: &Path, label: &str) -> Result<(), Error>;

    fn swapon(&self, path: &Path) -> Result<(), Error>;

    /// Flushes all filesystem buffers.
    fn sync(&self);

    /// Blocks for `duration`.
    fn settle(&self, duration: Duration);
}

/// The running Linux system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsHost;

impl SwapHost for OsHost {
    fn is_root(&self) -> bool {
        Uid::effective().is_root()
    }

    fn require(&self, binaries: &[Dependency]) -> Result<(), SwapError> {
        for binary in binaries {
            binary
                .path()
                .message(format!("'{binary}' is required to provision swap"))?;
        }
        Ok(())
    }

    fn root_source(&self) -> Result<Option<PathBuf>, Error> {
        findmnt::source_device(ROOT_MOUNT_POINT_PATH)
    }

    fn available_space_gib(&self, path: &Path) -> Result<u64, Error> {
        df::available_space_gib(path)
    }

    fn filesystem_type(&self, path: &Path) -> Result<FilesystemType, Error> {
        df::filesystem_type(path)
    }

    fn swap_total(&self) -> Result<u64, Error> {
        meminfo::swap_total()
    }

    fn active_swaps(&self) -> Result<Vec<SwapSpace>, Error> {
        SwapSpace::read()
    }

    fn swapoff(&self, path: &Path) -> Result<(), Error> {
        swap::swapoff(path)
    }

    fn prepare_nocow_file(&self, path: &Path) -> Result<(), Error> {
        cow::prepare_nocow_file(path)
    }

    fn zero_fill(&self, path: &Path, blocks: u64) -> Result<(), Error> {
        dd::zero_fill(path, blocks)
    }

    fn mkswap(&self, path: &Path, label: &str) -> Result<(), Error> {
        swap::mkswap(path, label)
    }

    fn swapon(&self, path: &Path) -> Result<(), Error> {
        swap::swapon(path)
    }

    fn sync(&self) {
        nix::unistd::sync();
    }

    fn settle(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
