use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Error};

use osutils::{dependencies::Dependency, swap::SwapSpace};
use swap_api::{
    error::{ExecutionEnvironmentMisconfigurationError, SwapError},
    ProvisionerConfig,
};
use sysdefs::filesystems::FilesystemType;

use crate::engine::host::SwapHost;

/// In-memory host. Files are really created so the file-based steps can be
/// checked; every mutating call is recorded.
pub struct MockHost {
    pub root: bool,
    pub root_source: Option<PathBuf>,
    pub available_gib: u64,
    pub fs_type: FilesystemType,
    pub swap_total: u64,
    pub swaps: Vec<SwapSpace>,
    pub missing: Vec<Dependency>,
    failing: Vec<&'static str>,
    calls: RefCell<Vec<String>>,
}

impl MockHost {
    pub fn new(root_source: &str, available_gib: u64) -> Self {
        Self {
            root: true,
            root_source: Some(PathBuf::from(root_source)),
            available_gib,
            fs_type: FilesystemType::Ext4,
            swap_total: 0,
            swaps: Vec::new(),
            missing: Vec::new(),
            failing: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Makes the operation called `name` fail.
    pub fn failing(mut self, name: &'static str) -> Self {
        self.failing.push(name);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, name: &str) -> Result<(), Error> {
        if self.failing.contains(&name) {
            bail!("{name} failed");
        }
        Ok(())
    }
}

impl SwapHost for MockHost {
    fn is_root(&self) -> bool {
        self.root
    }

    fn require(&self, binaries: &[Dependency]) -> Result<(), SwapError> {
        match binaries.iter().find(|b| self.missing.contains(b)) {
            Some(binary) => Err(SwapError::new(
                ExecutionEnvironmentMisconfigurationError::MissingBinary {
                    binary: binary.name(),
                },
            )),
            None => Ok(()),
        }
    }

    fn root_source(&self) -> Result<Option<PathBuf>, Error> {
        self.check("findmnt")?;
        Ok(self.root_source.clone())
    }

    fn available_space_gib(&self, _path: &Path) -> Result<u64, Error> {
        self.check("df")?;
        Ok(self.available_gib)
    }

    fn filesystem_type(&self, _path: &Path) -> Result<FilesystemType, Error> {
        self.check("fstype")?;
        Ok(self.fs_type.clone())
    }

    fn swap_total(&self) -> Result<u64, Error> {
        self.check("meminfo")?;
        Ok(self.swap_total)
    }

    fn active_swaps(&self) -> Result<Vec<SwapSpace>, Error> {
        self.check("swaps")?;
        Ok(self.swaps.clone())
    }

    fn swapoff(&self, path: &Path) -> Result<(), Error> {
        self.record(format!("swapoff {}", path.display()));
        self.check("swapoff")
    }

    fn prepare_nocow_file(&self, path: &Path) -> Result<(), Error> {
        self.record(format!("nocow {}", path.display()));
        self.check("nocow")?;
        fs::write(path, "")?;
        Ok(())
    }

    fn zero_fill(&self, path: &Path, blocks: u64) -> Result<(), Error> {
        self.record(format!("dd {} {blocks}", path.display()));
        // dd leaves a partial file behind when it fails
        fs::write(path, "")?;
        self.check("dd")
    }

    fn mkswap(&self, path: &Path, label: &str) -> Result<(), Error> {
        self.record(format!("mkswap {label} {}", path.display()));
        self.check("mkswap")
    }

    fn swapon(&self, path: &Path) -> Result<(), Error> {
        self.record(format!("swapon {}", path.display()));
        self.check("swapon")
    }

    fn sync(&self) {
        self.record("sync".into());
    }

    fn settle(&self, duration: Duration) {
        self.record(format!("settle {}", duration.as_secs()));
    }
}

/// Configuration rooted in `dir`, with `dir/root` standing in for `/`.
pub fn test_config(dir: &Path) -> ProvisionerConfig {
    let config = ProvisionerConfig {
        mount_prefix: dir.join("mnt"),
        default_base_path: dir.join("root"),
        fstab_path: dir.join("etc/fstab"),
        zram_config_path: dir.join("etc/default/armbian-zram-config"),
        settle_seconds: 0,
        background_log_path: None,
        ..Default::default()
    };
    fs::create_dir_all(&config.default_base_path).unwrap();
    fs::create_dir_all(dir.join("etc/default")).unwrap();
    config
}
