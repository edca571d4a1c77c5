//! Recursive markdown discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    error::{Error, Result},
    types::ENABLED_SUFFIX,
};

/// Every `*.md` file under `root`, at any depth, sorted by path.
///
/// Fails with [`Error::NotFound`] when `root` does not exist.
pub fn scan_markdown(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(Error::not_found("directory", root));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(ENABLED_SUFFIX));
        if is_markdown {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(root = %root.display(), count = files.len(), "scanned for markdown files");
    Ok(files)
}
