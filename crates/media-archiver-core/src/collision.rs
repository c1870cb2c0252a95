use crate::error::Error;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Upper bound on `stem (n).ext` probes before giving up on a file.
pub const MAX_COLLISION_PROBES: u32 = 9999;

/// Find a destination for `desired_name` in `directory` that does not exist yet.
///
/// Names are handled as `OsStr` so a file name that is not valid UTF-8 keeps
/// its exact bytes in the archive.
pub fn resolve_destination(
    directory: &Path,
    desired_name: impl AsRef<OsStr>,
) -> Result<PathBuf, Error> {
    resolve_destination_with(directory, desired_name, |_| false)
}

/// Same as [`resolve_destination`], but also treats any path for which
/// `claimed` returns true as taken. The executor uses this to keep dry-run
/// predictions consistent with what an apply run would produce.
pub fn resolve_destination_with<F>(
    directory: &Path,
    desired_name: impl AsRef<OsStr>,
    claimed: F,
) -> Result<PathBuf, Error>
where
    F: Fn(&Path) -> bool,
{
    resolve_destination_within(directory, desired_name, MAX_COLLISION_PROBES, claimed)
}

/// [`resolve_destination_with`] with an explicit probe ceiling.
pub fn resolve_destination_within<F>(
    directory: &Path,
    desired_name: impl AsRef<OsStr>,
    max_probes: u32,
    claimed: F,
) -> Result<PathBuf, Error>
where
    F: Fn(&Path) -> bool,
{
    let desired_name = desired_name.as_ref();
    let first = directory.join(desired_name);
    if is_free(&first, &claimed)? {
        return Ok(first);
    }

    let (stem, extension) = split_name(desired_name);
    for n in 1..=max_probes {
        let candidate = directory.join(numbered_name(stem, extension, n));
        if is_free(&candidate, &claimed)? {
            return Ok(candidate);
        }
    }

    Err(Error::CollisionExhausted {
        directory: directory.to_path_buf(),
        name: desired_name.to_string_lossy().into_owned(),
        attempts: max_probes,
    })
}

fn is_free<F>(path: &Path, claimed: &F) -> Result<bool, Error>
where
    F: Fn(&Path) -> bool,
{
    if claimed(path) {
        return Ok(false);
    }
    // symlink_metadata so a dangling link still counts as occupied.
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(false),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(err) => Err(Error::Io(io::Error::new(
            err.kind(),
            format!("Error checking {}: {}", path.display(), err),
        ))),
    }
}

/// Split on the last dot. A leading dot belongs to the stem (`.hidden`).
fn split_name(name: &OsStr) -> (&OsStr, Option<&OsStr>) {
    let path = Path::new(name);
    match path.file_stem() {
        Some(stem) => (stem, path.extension()),
        None => (name, None),
    }
}

fn numbered_name(stem: &OsStr, extension: Option<&OsStr>, n: u32) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!(" ({})", n));
    if let Some(ext) = extension {
        name.push(".");
        name.push(ext);
    }
    name
}
