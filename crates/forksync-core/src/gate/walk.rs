//! Checkout listing for the dual-checkout comparison

use std::collections::BTreeSet;
use std::path::Path;

use forksync_fs::{NormalizedPath, is_excluded_dir};
use walkdir::{DirEntry, WalkDir};

use crate::{Error, Result};

/// Repository-relative paths of every file under `root`, skipping
/// version-control metadata and dependency directories.
pub(crate) fn list_files(root: &Path) -> Result<BTreeSet<String>> {
    if !root.is_dir() {
        return Err(Error::CheckoutNotFound {
            path: root.to_path_buf(),
        });
    }

    let base = NormalizedPath::new(root);
    let mut files = BTreeSet::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = NormalizedPath::new(entry.path()).relative_to(&base)?;
        files.insert(relative);
    }

    tracing::debug!(root = %root.display(), files = files.len(), "Listed checkout");
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(is_excluded_dir)
}
