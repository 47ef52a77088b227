use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use log::debug;

use swap_api::constants::{
    FSTAB_SWAP_MARKER, NONE_MOUNT_POINT, SWAP_FILESYSTEM, SWAP_MOUNT_OPTIONS,
};

use crate::files;

/// A swap line of a tab file.
#[derive(Debug, PartialEq, Eq)]
pub struct TabFileEntry {
    pub device: PathBuf,
}

impl TabFileEntry {
    /// Create a new entry for a file or block device used as swap.
    pub fn new_swap(device: impl Into<PathBuf>) -> Self {
        Self {
            device: device.into(),
        }
    }

    /// Render this entry as a line suitable for writing to a tab file.
    pub fn render(&self) -> String {
        format!(
            "{} {NONE_MOUNT_POINT} {SWAP_FILESYSTEM} {SWAP_MOUNT_OPTIONS} 0 0\n",
            self.device.display(),
        )
    }
}

/// Returns `contents` with every swap-related line removed and `entry`
/// appended.
///
/// A line is swap related when it contains the word `swap` anywhere,
/// comments included.
pub fn replace_swap_entries(contents: &str, entry: &TabFileEntry) -> String {
    let mut rendered = contents
        .lines()
        .filter(|line| !line.contains(FSTAB_SWAP_MARKER))
        .fold(String::with_capacity(contents.len()), |mut acc, line| {
            acc.push_str(line);
            acc.push('\n');
            acc
        });

    rendered.push_str(&entry.render());
    rendered
}

/// Rewrites the tab file at `tab_file_path` so that `entry` is its only swap
/// line. A missing tab file is created.
///
/// The file is replaced atomically: on failure the previous contents stay in
/// place.
pub fn update_swap_entry(
    tab_file_path: impl AsRef<Path>,
    entry: &TabFileEntry,
) -> Result<(), Error> {
    let tab_file_path = tab_file_path.as_ref();
    let contents = match fs::read_to_string(tab_file_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("'{}' does not exist, creating it", tab_file_path.display());
            String::new()
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read {}", tab_file_path.display()))
        }
    };

    files::write_atomically(
        tab_file_path,
        replace_swap_entries(&contents, entry).as_bytes(),
    )
    .with_context(|| format!("Failed to write new {}", tab_file_path.display()))
}

/// Counts the swap lines of a tab file, comments excluded.
pub fn count_swap_entries(contents: &str) -> usize {
    contents
        .lines()
        .filter(|line| {
            let mut fields = line.split_whitespace();
            !line.trim_start().starts_with('#')
                && fields.nth(1) == Some(NONE_MOUNT_POINT)
                && fields.next() == Some(SWAP_FILESYSTEM)
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;

    use indoc::indoc;

    #[test]
    fn test_render() {
        assert_eq!(
            TabFileEntry::new_swap("/.swap/swapfile").render(),
            "/.swap/swapfile none swap defaults 0 0\n"
        );
        assert_eq!(
            TabFileEntry::new_swap("/mnt/mmcblk1p2/.swap/swapfile").render(),
            "/mnt/mmcblk1p2/.swap/swapfile none swap defaults 0 0\n"
        );
    }

    #[test]
    fn test_replace_swap_entries() {
        let fstab = indoc! {r#"
            # <file system> <mount point> <type> <options> <dump> <pass>
            LABEL=ROOTFS / btrfs defaults,noatime,compress=zstd 0 1
            LABEL=BOOT /boot vfat defaults 0 2
            /mnt/mmcblk1p2/.swap/swapfile none swap defaults 0 0
            /dev/sda3 none swap sw 0 0
            # old swap file
            tmpfs /tmp tmpfs defaults,nosuid 0 0
        "#};

        let entry = TabFileEntry::new_swap("/.swap/swapfile");
        let rendered = replace_swap_entries(fstab, &entry);

        assert_eq!(
            rendered,
            indoc! {r#"
                # <file system> <mount point> <type> <options> <dump> <pass>
                LABEL=ROOTFS / btrfs defaults,noatime,compress=zstd 0 1
                LABEL=BOOT /boot vfat defaults 0 2
                tmpfs /tmp tmpfs defaults,nosuid 0 0
                /.swap/swapfile none swap defaults 0 0
            "#}
        );
        assert_eq!(count_swap_entries(&rendered), 1);

        // Running again is stable
        assert_eq!(replace_swap_entries(&rendered, &entry), rendered);
    }

    #[test]
    fn test_replace_swap_entries_missing_trailing_newline() {
        let rendered = replace_swap_entries(
            "LABEL=ROOTFS / ext4 defaults 0 1",
            &TabFileEntry::new_swap("/swapfile"),
        );
        assert_eq!(
            rendered,
            "LABEL=ROOTFS / ext4 defaults 0 1\n/swapfile none swap defaults 0 0\n"
        );

        let rendered = replace_swap_entries("", &TabFileEntry::new_swap("/swapfile"));
        assert_eq!(rendered, "/swapfile none swap defaults 0 0\n");
    }

    #[test]
    fn test_update_swap_entry() {
        let dir = tempfile::tempdir().unwrap();
        let fstab = dir.path().join("fstab");

        // Missing file is created
        update_swap_entry(&fstab, &TabFileEntry::new_swap("/a/swapfile")).unwrap();
        assert_eq!(
            fs::read_to_string(&fstab).unwrap(),
            "/a/swapfile none swap defaults 0 0\n"
        );

        fs::write(
            &fstab,
            "LABEL=ROOTFS / ext4 defaults 0 1\n/a/swapfile none swap defaults 0 0\n/b/swapfile none swap defaults 0 0\n",
        )
        .unwrap();
        fs::set_permissions(&fstab, fs::Permissions::from_mode(0o640)).unwrap();
        update_swap_entry(&fstab, &TabFileEntry::new_swap("/c/swapfile")).unwrap();
        let contents = fs::read_to_string(&fstab).unwrap();
        assert_eq!(
            contents,
            "LABEL=ROOTFS / ext4 defaults 0 1\n/c/swapfile none swap defaults 0 0\n"
        );
        assert_eq!(count_swap_entries(&contents), 1);
        assert_eq!(
            fs::metadata(&fstab).unwrap().permissions().mode() & 0o777,
            0o640
        );

        // Writing into a missing directory fails
        let err = update_swap_entry(
            dir.path().join("missing/fstab"),
            &TabFileEntry::new_swap("/swapfile"),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Failed to write new"));
    }

    #[test]
    fn test_count_swap_entries() {
        assert_eq!(
            count_swap_entries(indoc! {r#"
                LABEL=ROOTFS / ext4 defaults 0 1
                # /swapfile none swap defaults 0 0
                /swapfile none swap defaults 0 0
                /dev/zram0 none swap pri=100 0 0
            "#}),
            2
        );
        assert_eq!(count_swap_entries(""), 0);
    }
}
