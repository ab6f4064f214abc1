//! Source discovery for batch builds.
//!
//! Recursively lists transformable files under a directory. The walk is
//! sorted by file name so builds and reports are reproducible.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::transform::SourceKind;

/// Directory names never descended into.
const SKIPPED_DIRS: [&str; 1] = ["node_modules"];

/// All `.js`, `.jsx` and `.mjs` files under `root`, depth-first in name
/// order. Hidden entries and `node_modules` are skipped; unreadable entries
/// are logged and skipped.
pub fn discover_sources(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && SourceKind::from_path(entry.path()).is_some() {
                    files.push(entry.into_path());
                }
            }
            Err(err) => warn!(root = %root.display(), error = %err, "skipping unreadable entry"),
        }
    }

    files
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name.as_ref()))
}
