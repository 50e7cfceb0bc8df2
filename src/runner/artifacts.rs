use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::error::{Result, VitalsUpError};
use crate::discovery::page_dir;

fn artifact_error(path: &Path) -> impl FnOnce(io::Error) -> VitalsUpError + '_ {
    move |source| VitalsUpError::ArtifactMove {
        path: path.to_path_buf(),
        source,
    }
}

/// Remove a file or directory tree if it exists
pub fn remove_if_exists(path: &Path) -> Result<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(artifact_error(path))
}

/// Move a finished tool output folder to `<base_dir>/<release>/<page>`.
///
/// An earlier folder for the same release and page is replaced.
pub fn relocate_output(
    staging: &Path,
    base_dir: &Path,
    release: &str,
    page: &str,
) -> Result<PathBuf> {
    if !staging.is_dir() {
        return Err(VitalsUpError::ArtifactMove {
            path: staging.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                "the tool did not produce an output folder",
            ),
        });
    }

    let destination = page_dir(base_dir, release, page);
    remove_if_exists(&destination)?;
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(artifact_error(parent))?;
    }
    fs::rename(staging, &destination).map_err(artifact_error(&destination))?;

    Ok(destination)
}

/// Delete every top-level entry of `dir` not named in `retain`.
///
/// Returns the removed names, sorted.
pub fn prune_artifacts(dir: &Path, retain: &HashSet<String>) -> Result<Vec<String>> {
    let mut removed = Vec::new();

    for entry in fs::read_dir(dir).map_err(artifact_error(dir))? {
        let entry = entry.map_err(artifact_error(dir))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if retain.contains(&name) {
            continue;
        }
        remove_if_exists(&entry.path())?;
        removed.push(name);
    }

    removed.sort();
    Ok(removed)
}
