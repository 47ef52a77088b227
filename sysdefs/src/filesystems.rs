use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use strum_macros::{EnumIs, IntoStaticStr};

/// Filesystem type as reported by the kernel (`df --output=fstype`,
/// `/proc/self/mountinfo`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(from = "String", into = "String")]
pub enum FilesystemType {
    Btrfs,
    Exfat,
    Ext2,
    Ext3,
    Ext4,
    F2fs,
    Ntfs,
    Overlay,
    Tmpfs,
    Vfat,
    Xfs,
    Other(String),
}

impl FilesystemType {
    /// Whether the filesystem defers block copies until write.
    ///
    /// A swap file on such a filesystem must have copy-on-write and
    /// compression disabled while it is still empty, otherwise the kernel
    /// refuses to activate it.
    pub fn is_copy_on_write(&self) -> bool {
        matches!(self, FilesystemType::Btrfs)
    }
}

impl Display for FilesystemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FilesystemType::Other(name) => f.write_str(name),
            known => f.write_str(known.into()),
        }
    }
}

impl From<&str> for FilesystemType {
    fn from(fs: &str) -> Self {
        match fs.trim() {
            "btrfs" => FilesystemType::Btrfs,
            "exfat" => FilesystemType::Exfat,
            "ext2" => FilesystemType::Ext2,
            "ext3" => FilesystemType::Ext3,
            "ext4" => FilesystemType::Ext4,
            "f2fs" => FilesystemType::F2fs,
            "ntfs" => FilesystemType::Ntfs,
            "overlay" => FilesystemType::Overlay,
            "tmpfs" => FilesystemType::Tmpfs,
            "vfat" => FilesystemType::Vfat,
            "xfs" => FilesystemType::Xfs,
            other => FilesystemType::Other(other.to_string()),
        }
    }
}

impl From<String> for FilesystemType {
    fn from(fs: String) -> Self {
        fs.as_str().into()
    }
}

impl From<FilesystemType> for String {
    fn from(fs: FilesystemType) -> Self {
        fs.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(FilesystemType::from("btrfs"), FilesystemType::Btrfs);
        assert_eq!(FilesystemType::from("ext4\n"), FilesystemType::Ext4);
        assert_eq!(FilesystemType::from("f2fs"), FilesystemType::F2fs);
        assert_eq!(
            FilesystemType::from("zfs"),
            FilesystemType::Other("zfs".into())
        );
        // Names are case sensitive, as the kernel reports them
        assert_eq!(
            FilesystemType::from("Btrfs"),
            FilesystemType::Other("Btrfs".into())
        );
    }

    #[test]
    fn test_known_names_round_trip() {
        for fs in [
            FilesystemType::Btrfs,
            FilesystemType::Exfat,
            FilesystemType::Ext2,
            FilesystemType::Ext3,
            FilesystemType::Ext4,
            FilesystemType::F2fs,
            FilesystemType::Ntfs,
            FilesystemType::Overlay,
            FilesystemType::Tmpfs,
            FilesystemType::Vfat,
            FilesystemType::Xfs,
        ] {
            assert_eq!(FilesystemType::from(fs.to_string().as_str()), fs);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(FilesystemType::Btrfs.to_string(), "btrfs");
        assert_eq!(FilesystemType::Other("zfs".into()).to_string(), "zfs");
    }

    #[test]
    fn test_copy_on_write() {
        assert!(FilesystemType::Btrfs.is_copy_on_write());
        assert!(!FilesystemType::Ext4.is_copy_on_write());
        assert!(!FilesystemType::Other("zfs".into()).is_copy_on_write());
    }

    #[test]
    fn test_serde() {
        let fs: FilesystemType = serde_json::from_str(r#""xfs""#).unwrap();
        assert_eq!(fs, FilesystemType::Xfs);
        assert!(fs.is_xfs());

        let fs: FilesystemType = serde_json::from_str(r#""bcachefs""#).unwrap();
        assert!(fs.is_other());

        assert_eq!(
            serde_json::to_string(&FilesystemType::Btrfs).unwrap(),
            r#""btrfs""#
        );
    }
}
