use const_format::formatcp;

/// Name of the tool, used for default paths.
pub const TOOL_NAME: &str = "armbian-swap";

/// Path of the root mount point.
pub const ROOT_MOUNT_POINT_PATH: &str = "/";

/// Default configuration file.
pub const DEFAULT_CONFIG_PATH: &str = formatcp!("/etc/{TOOL_NAME}/config.yaml");

/// Default JSON-lines log written alongside the console output.
pub const DEFAULT_BACKGROUND_LOG_PATH: &str = formatcp!("/var/log/{TOOL_NAME}.log");

/// Directory under which secondary partitions are expected to be mounted.
pub const DEFAULT_MOUNT_PREFIX: &str = "/mnt";

/// Base path used when no secondary partition is mounted.
pub const DEFAULT_BASE_PATH: &str = ROOT_MOUNT_POINT_PATH;

/// Name of the directory holding the swap file.
pub const DEFAULT_SWAP_DIR_NAME: &str = ".swap";

/// Name of the swap file itself.
pub const DEFAULT_SWAP_FILE_NAME: &str = "swapfile";

/// Volume label written by mkswap.
pub const DEFAULT_SWAP_LABEL: &str = "SWAP";

/// Persistent mount table.
pub const DEFAULT_FSTAB_PATH: &str = "/etc/fstab";

/// Armbian zram configuration.
pub const DEFAULT_ZRAM_CONFIG_PATH: &str = "/etc/default/armbian-zram-config";

/// Seconds to wait for the kernel to settle swap accounting.
pub const DEFAULT_SETTLE_SECONDS: u64 = 3;

/// Partition number of the secondary data partition on the root disk.
pub const SECONDARY_PARTITION_NUMBER: u32 = 2;

/// Swap size used when the requested size is missing or unusable.
pub const DEFAULT_SWAP_SIZE_GIB: u64 = 1;

/// Number of 1 KiB blocks in one GiB.
pub const KIB_PER_GIB: u64 = 1024 * 1024;

/// Name of the swap filesystem type in the mount table.
pub const SWAP_FILESYSTEM: &str = "swap";

/// Mount point column of swap entries.
pub const NONE_MOUNT_POINT: &str = "none";

/// Mount options of the swap entry.
pub const SWAP_MOUNT_OPTIONS: &str = "defaults";

/// Word that marks a mount table line as swap related.
pub const FSTAB_SWAP_MARKER: &str = "swap";

/// zram directive shipped commented out by Armbian.
pub const ZRAM_SWAP_COMMENTED_DIRECTIVE: &str = "# SWAP=false";

/// zram directive that disables zram swap.
pub const ZRAM_SWAP_DISABLED_DIRECTIVE: &str = "SWAP=false";
