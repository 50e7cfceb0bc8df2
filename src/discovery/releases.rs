use std::path::{Path, PathBuf};

use crate::core::error::{Result, VitalsUpError};
use crate::core::types::ReleaseId;

/// List the release directories directly under `base_dir`, oldest first.
///
/// Entries whose name is not `<prefix><N>` and plain files are skipped.
/// A missing or unreadable base directory is an error.
pub fn discover_releases(base_dir: &Path, prefix: &str) -> Result<Vec<ReleaseId>> {
    if !base_dir.is_dir() {
        return Err(VitalsUpError::ReleaseDiscovery(format!(
            "'{}' is not a directory",
            base_dir.display()
        )));
    }

    let mut builder = ignore::WalkBuilder::new(base_dir);
    builder.max_depth(Some(1)).standard_filters(false);

    let mut releases = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        if !entry.file_type().is_some_and(|kind| kind.is_dir()) {
            continue;
        }
        if let Some(release) = entry
            .file_name()
            .to_str()
            .and_then(|name| ReleaseId::parse(name, prefix))
        {
            releases.push(release);
        }
    }

    releases.sort();
    Ok(releases)
}

/// Folder holding one page's results for one release
pub fn page_dir(base_dir: &Path, release: &str, page: &str) -> PathBuf {
    base_dir.join(release).join(page)
}

/// Summary file of one page in one release
pub fn summary_path(base_dir: &Path, release: &str, page: &str, summary_file: &str) -> PathBuf {
    page_dir(base_dir, release, page).join(summary_file)
}
