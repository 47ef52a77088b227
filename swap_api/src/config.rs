use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_BACKGROUND_LOG_PATH, DEFAULT_BASE_PATH, DEFAULT_FSTAB_PATH, DEFAULT_MOUNT_PREFIX,
        DEFAULT_SETTLE_SECONDS, DEFAULT_SWAP_DIR_NAME, DEFAULT_SWAP_FILE_NAME, DEFAULT_SWAP_LABEL,
        DEFAULT_ZRAM_CONFIG_PATH,
    },
    error::{InvalidInputError, ReportError, SwapError},
};

/// Tunables of the swap provisioner.
///
/// Every field is optional in the YAML file; missing fields fall back to the
/// Armbian defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ProvisionerConfig {
    /// Directory under which secondary partitions are mounted.
    pub mount_prefix: PathBuf,

    /// Base path used when the secondary partition is not mounted.
    pub default_base_path: PathBuf,

    /// Name of the directory, under the base path, that holds the swap file.
    pub swap_dir_name: String,

    /// File name of the swap file.
    pub swap_file_name: String,

    /// Label passed to mkswap.
    pub label: String,

    /// Persistent mount table to update.
    pub fstab_path: PathBuf,

    /// zram configuration whose swap directive gets disabled.
    pub zram_config_path: PathBuf,

    /// Pause after activation so swap accounting can settle.
    pub settle_seconds: u64,

    /// Remove a partially created swap file when provisioning fails.
    pub rollback_on_failure: bool,

    /// JSON-lines log file. Set to null to disable.
    pub background_log_path: Option<PathBuf>,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            mount_prefix: DEFAULT_MOUNT_PREFIX.into(),
            default_base_path: DEFAULT_BASE_PATH.into(),
            swap_dir_name: DEFAULT_SWAP_DIR_NAME.into(),
            swap_file_name: DEFAULT_SWAP_FILE_NAME.into(),
            label: DEFAULT_SWAP_LABEL.into(),
            fstab_path: DEFAULT_FSTAB_PATH.into(),
            zram_config_path: DEFAULT_ZRAM_CONFIG_PATH.into(),
            settle_seconds: DEFAULT_SETTLE_SECONDS,
            rollback_on_failure: true,
            background_log_path: Some(DEFAULT_BACKGROUND_LOG_PATH.into()),
        }
    }
}

impl ProvisionerConfig {
    /// Loads the configuration from `path`.
    ///
    /// When `required` is false a missing file yields the defaults; a file
    /// that exists but cannot be read or parsed is always an error.
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self, SwapError> {
        let path = path.as_ref();
        if !path.exists() && !required {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).structured(InvalidInputError::LoadConfig {
            path: path.display().to_string(),
        })?;

        Self::parse(&contents)
    }

    /// Parses a YAML document into a configuration.
    pub fn parse(contents: &str) -> Result<Self, SwapError> {
        // An empty document deserializes to null rather than an empty map.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(contents).structured(InvalidInputError::ParseConfig)
    }
}
