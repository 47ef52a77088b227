use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    sync::OnceLock,
};

use anyhow::{bail, Context, Error};
use regex::Regex;
use serde::Serialize;

/// Partition naming conventions of the disks a board can boot from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionScheme {
    /// On-chip multi-partition storage: eMMC and SD cards, e.g. `mmcblk1p2`.
    Mmc,
    /// Lettered disks (SATA, USB, virtio, IDE), e.g. `sda2`.
    Lettered,
    /// NVMe namespaces, e.g. `nvme0n1p2`.
    Nvme,
}

impl PartitionScheme {
    /// Separator between the disk name and the partition number.
    pub fn partition_prefix(&self) -> &'static str {
        match self {
            PartitionScheme::Mmc | PartitionScheme::Nvme => "p",
            PartitionScheme::Lettered => "",
        }
    }
}

/// The partition holding the root filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RootPartition {
    /// Kernel name of the partition, e.g. `mmcblk1p2`.
    pub name: String,
    /// Kernel name of the parent disk, e.g. `mmcblk1`.
    pub disk: String,
    pub scheme: PartitionScheme,
    pub number: u32,
}

fn patterns() -> &'static [(PartitionScheme, Regex); 3] {
    static PATTERNS: OnceLock<[(PartitionScheme, Regex); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Constant expressions, known to compile.
        [
            (
                PartitionScheme::Mmc,
                Regex::new(r"^(?P<disk>mmcblk[0-9]+)p(?P<part>[1-9][0-9]*)$").unwrap(),
            ),
            (
                PartitionScheme::Lettered,
                Regex::new(r"^(?P<disk>[hsv]d[a-z]+)(?P<part>[1-9][0-9]*)$").unwrap(),
            ),
            (
                PartitionScheme::Nvme,
                Regex::new(r"^(?P<disk>nvme[0-9]+n[0-9]+)p(?P<part>[1-9][0-9]*)$").unwrap(),
            ),
        ]
    })
}

impl RootPartition {
    /// Classifies a partition by its kernel name or device path.
    ///
    /// Accepts `mmcblk1p2`, `/dev/mmcblk1p2` and the `findmnt` form of btrfs
    /// subvolume mounts, `/dev/mmcblk1p2[/@]`.
    pub fn parse(device: impl AsRef<Path>) -> Result<Self, Error> {
        let device = device.as_ref().to_string_lossy();
        let name = device
            .split('[')
            .next()
            .unwrap_or_default()
            .trim_start_matches("/dev/");

        for (scheme, pattern) in patterns() {
            if let Some(caps) = pattern.captures(name) {
                return Ok(Self {
                    name: name.to_string(),
                    disk: caps["disk"].to_string(),
                    scheme: *scheme,
                    number: caps["part"]
                        .parse()
                        .with_context(|| format!("Invalid partition number in '{name}'"))?,
                });
            }
        }

        bail!("Unable to recognize the disk type of '{device}'")
    }

    /// Kernel name of the partition numbered `number` on the same disk.
    pub fn sibling(&self, number: u32) -> String {
        format!("{}{}{}", self.disk, self.scheme.partition_prefix(), number)
    }
}

impl Display for RootPartition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} (partition {} of {})", self.name, self.number, self.disk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(device: &str, disk: &str, scheme: PartitionScheme, number: u32) {
        let partition = RootPartition::parse(device).unwrap();
        assert_eq!(partition.disk, disk, "disk of {device}");
        assert_eq!(partition.scheme, scheme, "scheme of {device}");
        assert_eq!(partition.number, number, "number of {device}");
    }

    #[test]
    fn test_parse_mmc() {
        check("mmcblk0p1", "mmcblk0", PartitionScheme::Mmc, 1);
        check("/dev/mmcblk1p2", "mmcblk1", PartitionScheme::Mmc, 2);
        check("/dev/mmcblk2p4", "mmcblk2", PartitionScheme::Mmc, 4);
        check("/dev/mmcblk10p12", "mmcblk10", PartitionScheme::Mmc, 12);
    }

    #[test]
    fn test_parse_lettered() {
        check("/dev/sda2", "sda", PartitionScheme::Lettered, 2);
        check("/dev/hdb1", "hdb", PartitionScheme::Lettered, 1);
        check("/dev/vda3", "vda", PartitionScheme::Lettered, 3);
        check("sdaa1", "sdaa", PartitionScheme::Lettered, 1);
    }

    #[test]
    fn test_parse_nvme() {
        check("/dev/nvme0n1p2", "nvme0n1", PartitionScheme::Nvme, 2);
        check("nvme1n2p1", "nvme1n2", PartitionScheme::Nvme, 1);
    }

    #[test]
    fn test_parse_btrfs_subvolume() {
        check("/dev/mmcblk1p2[/@]", "mmcblk1", PartitionScheme::Mmc, 2);
        assert_eq!(
            RootPartition::parse("/dev/mmcblk1p2[/@]").unwrap().name,
            "mmcblk1p2"
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        for device in [
            "/dev/mapper/root",
            "/dev/sda",
            "/dev/mmcblk0",
            "/dev/mmcblk0boot0",
            "/dev/nvme0n1",
            "/dev/zram0",
            "/dev/loop0p1",
            "/dev/sda0",
            "overlay",
            "",
        ] {
            let err = RootPartition::parse(device).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Unable to recognize the disk type of '{device}'")
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RootPartition::parse("/dev/nvme0n1p2").unwrap().to_string(),
            "nvme0n1p2 (partition 2 of nvme0n1)"
        );
    }

    #[test]
    fn test_sibling() {
        let partition = RootPartition::parse("/dev/mmcblk1p1").unwrap();
        assert_eq!(partition.sibling(2), "mmcblk1p2");

        let partition = RootPartition::parse("/dev/sda1").unwrap();
        assert_eq!(partition.sibling(2), "sda2");

        let partition = RootPartition::parse("/dev/nvme0n1p3").unwrap();
        assert_eq!(partition.sibling(2), "nvme0n1p2");
    }

    #[test]
    fn test_partition_prefix() {
        assert_eq!(PartitionScheme::Mmc.partition_prefix(), "p");
        assert_eq!(PartitionScheme::Lettered.partition_prefix(), "");
        assert_eq!(PartitionScheme::Nvme.partition_prefix(), "p");
    }
}
