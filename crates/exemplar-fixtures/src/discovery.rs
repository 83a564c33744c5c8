use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

const FIXTURE_EXTENSION: &str = "toml";

/// Discover fixture files under a path, sorted by path.
///
/// A file path is returned as-is, whatever its extension. A missing path
/// yields no fixtures.
///
/// # Errors
/// Returns an error if walking a directory fails.
pub fn discover_fixtures(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.exists() {
        debug!(root = %root.display(), "fixture path does not exist");
        return Ok(Vec::new());
    }

    let mut fixtures = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == FIXTURE_EXTENSION)
        {
            fixtures.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), count = fixtures.len(), "discovered fixtures");
    Ok(fixtures)
}

/// Discover fixtures under every root, sorted and without duplicates.
///
/// # Errors
/// Returns an error if walking any directory fails.
pub fn discover_all(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut fixtures = BTreeSet::new();
    for root in roots {
        fixtures.extend(discover_fixtures(root)?);
    }
    Ok(fixtures.into_iter().collect())
}
