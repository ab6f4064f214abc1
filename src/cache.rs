//! Incremental build cache.
//!
//! A JSON manifest mapping each source's relative path to the SHA-256 of its
//! text and the options it was transformed with. A source whose hash is
//! unchanged and whose output still exists is not transformed again.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, TransformError};
use crate::transform::TransformOptions;

/// Manifest file name inside the output directory.
pub const CACHE_FILE: &str = ".jsxc-cache.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl TransformCache {
    /// Loads a manifest. A missing file is an empty cache; a corrupt one is
    /// logged, removed, and treated as empty.
    pub fn load(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&data) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding corrupt transform cache");
                fs::remove_file(path).ok();
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let name = path.to_string_lossy();
        let data = serde_json::to_string_pretty(self).map_err(|e| {
            TransformError::new(crate::error::ErrorKind::Io, e.to_string(), 0, &name)
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TransformError::io(&e, &name))?;
        }
        fs::write(path, data).map_err(|e| TransformError::io(&e, &name))?;
        debug!(path = %name, entries = self.entries.len(), "saved transform cache");
        Ok(())
    }

    pub fn compute_hash(source: &str, options: &TransformOptions) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
        hasher.update(serde_json::to_string(options).unwrap_or_default().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Whether `key` was last transformed from input hashing to `hash` and
    /// its output is still on disk.
    pub fn is_fresh(&self, key: &str, hash: &str, output: &Path) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.hash == hash) && output.is_file()
    }

    pub fn record(&mut self, key: impl Into<String>, hash: impl Into<String>) {
        self.entries.insert(key.into(), CacheEntry { hash: hash.into() });
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drops entries whose key is not in `keys` (deleted sources).
    pub fn retain_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = keys.into_iter().collect();
        self.entries.retain(|key, _| keep.contains(key.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
