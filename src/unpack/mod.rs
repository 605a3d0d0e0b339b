//! Zip archive extraction
//!
//! Extraction is idempotent on the destination directory: if it exists, the
//! archive is assumed fully unpacked and nothing is touched. An interrupted
//! unpack leaves a directory that later runs will trust as complete; that is
//! a known gap inherited from the presence-is-the-marker contract.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

/// Derive the extraction directory for an archive path by stripping the
/// `.zip` suffix. Returns `None` when the path does not look like a zip.
pub fn extraction_dir(archive_path: &Path) -> Option<PathBuf> {
    let name = archive_path.to_str()?;
    if !name.to_lowercase().ends_with(".zip") {
        return None;
    }
    Some(PathBuf::from(&name[..name.len() - 4]))
}

/// Extract every entry of `archive` into `dest`, returning the written file
/// paths in archive-declared order.
///
/// If `dest` already exists this is a cache hit: returns an empty list and
/// success. Processing is fail-fast; the first bad entry aborts with no
/// partial-result reporting.
pub fn unpack(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    if dest.exists() {
        debug!("Already unpacked, skipping: {}", dest.display());
        return Ok(Vec::new());
    }

    let file = File::open(archive)
        .map_err(|e| Error::Filesystem(format!("{}: {}", archive.display(), e)))?;
    let mut zip = ZipArchive::new(file)?;

    std::fs::create_dir_all(dest)
        .map_err(|e| Error::Filesystem(format!("{}: {}", dest.display(), e)))?;

    let mut extracted = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().map(Path::to_owned) else {
            return Err(Error::ArchiveFormat(format!(
                "Entry escapes the destination directory: {}",
                entry.name()
            )));
        };
        let path = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&path)?;
            set_unix_mode(&path, entry.unix_mode())?;
            continue;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&path)
            .map_err(|e| Error::Filesystem(format!("{}: {}", path.display(), e)))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| Error::ArchiveFormat(format!("{}: {}", entry.name(), e)))?;
        set_unix_mode(&path, entry.unix_mode())?;
        extracted.push(path);
    }

    info!(
        "Unpacked {} entries from {}",
        extracted.len(),
        archive.display()
    );
    Ok(extracted)
}

#[cfg(unix)]
fn set_unix_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_unix_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}
