use std::{
    fs::{self, File, Permissions},
    io::{self, Write},
    os::unix::fs::PermissionsExt,
    path::Path,
};

use anyhow::{Context, Error};

/// Creates all directories in a path if they don't exist
///
/// Returns whether anything was created.
pub fn create_dirs<S>(path: S) -> Result<bool, Error>
where
    S: AsRef<Path>,
{
    if path.as_ref().is_dir() {
        return Ok(false);
    }

    fs::create_dir_all(path.as_ref()).context(format!(
        "Could not create path: {}",
        path.as_ref().display()
    ))?;
    Ok(true)
}

/// Sets the permission bits of an existing file
pub fn set_mode<S>(path: S, mode: u32) -> Result<(), Error>
where
    S: AsRef<Path>,
{
    fs::set_permissions(path.as_ref(), Permissions::from_mode(mode)).context(format!(
        "Could not set permissions {:#o} for file {}",
        mode,
        path.as_ref().display()
    ))
}

/// Removes a file, succeeding if it is already gone
///
/// Returns whether a file was removed.
pub fn remove_file_if_exists<S>(path: S) -> Result<bool, Error>
where
    S: AsRef<Path>,
{
    match fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).context(format!(
            "Could not remove file: {}",
            path.as_ref().display()
        )),
    }
}

/// Permissions of files created by `write_atomically`.
const NEW_FILE_MODE: u32 = 0o644;

/// Replaces the contents of `path`, creating it if needed
///
/// The data is written to a temporary file in the same directory, flushed, and
/// renamed over `path`, so a failure never leaves `path` truncated. Existing
/// permissions are kept.
pub fn write_atomically<S>(path: S, contents: &[u8]) -> Result<(), Error>
where
    S: AsRef<Path>,
{
    replace_with(path.as_ref(), |file| file.write_all(contents))
}

fn replace_with<F>(path: &Path, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mode = match fs::metadata(path) {
        Ok(metadata) => metadata.permissions().mode() & 0o7777,
        Err(e) if e.kind() == io::ErrorKind::NotFound => NEW_FILE_MODE,
        Err(e) => {
            return Err(e).context(format!("Could not read metadata of {}", path.display()))
        }
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(parent).context(format!(
        "Failed to create temporary file next to {}",
        path.display()
    ))?;

    write(temp.as_file_mut())
        .and_then(|()| temp.as_file().sync_all())
        .context(format!("Could not write to file: {}", path.display()))?;
    temp.as_file()
        .set_permissions(Permissions::from_mode(mode))
        .context(format!(
            "Could not set permissions {:#o} for file {}",
            mode,
            path.display()
        ))?;

    temp.persist(path)
        .context(format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Replaces every occurrence of `from` with `to` in a text file, keeping its
/// permissions
///
/// Returns whether the file changed.
pub fn replace_in_file<S>(path: S, from: &str, to: &str) -> Result<bool, Error>
where
    S: AsRef<Path>,
{
    let contents = fs::read_to_string(path.as_ref()).context(format!(
        "Could not read file contents: {}",
        path.as_ref().display()
    ))?;

    if !contents.contains(from) {
        return Ok(false);
    }

    write_atomically(path.as_ref(), contents.replace(from, to).as_bytes())?;
    Ok(true)
}
