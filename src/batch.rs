//! # Batch Builds
//!
//! Transforms a source tree into an output tree:
//!
//! 1. discover `.js`/`.jsx`/`.mjs` files under `srcDir`,
//! 2. transform them in parallel (rayon), each with the mode its extension
//!    selects,
//! 3. write `<outDir>/<relative path>` with a `.js` extension,
//! 4. report what was transformed, reused from the cache, or failed.
//!
//! One file failing never stops the others. Sources that would write the
//! same output (`a.js` beside `a.jsx`) all fail and nothing is written for
//! them.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::{TransformCache, CACHE_FILE};
use crate::discovery::discover_sources;
use crate::error::{ErrorKind, Result, TransformError};
use crate::snippets::DEFAULT_HELPER_MODULE;
use crate::transform::{transform_with_options, TransformOptions};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG & REPORT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    #[serde(default)]
    pub strip_comments: bool,
    #[serde(default = "default_helper_module")]
    pub helper_module: String,
    /// Reuse outputs whose source and options are unchanged.
    #[serde(default = "default_incremental")]
    pub incremental: bool,
}

fn default_helper_module() -> String {
    DEFAULT_HELPER_MODULE.to_string()
}

fn default_incremental() -> bool {
    true
}

impl BuildConfig {
    pub fn new(src_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            out_dir: out_dir.into(),
            strip_comments: false,
            helper_module: default_helper_module(),
            incremental: true,
        }
    }

    /// Reads a camelCase JSON config. Relative directories are taken as
    /// relative to the config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy();
        let data = fs::read_to_string(path).map_err(|e| TransformError::io(&e, &name))?;
        let mut config: BuildConfig = serde_json::from_str(&data).map_err(|e| {
            TransformError::new(ErrorKind::Io, format!("Invalid build config: {}", e), e.line() as u32, &name)
        })?;
        if let Some(base) = path.parent() {
            if config.src_dir.is_relative() {
                config.src_dir = base.join(&config.src_dir);
            }
            if config.out_dir.is_relative() {
                config.out_dir = base.join(&config.out_dir);
            }
        }
        Ok(config)
    }

    fn base_options(&self) -> TransformOptions {
        TransformOptions {
            extended: true,
            strip_comments: self.strip_comments,
            helper_module: self.helper_module.clone(),
        }
    }
}

/// Outcome of a build; paths are relative to the source directory and use
/// `/` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub transformed: Vec<String>,
    pub cached: Vec<String>,
    pub failed: Vec<TransformError>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.transformed.len() + self.cached.len() + self.failed.len()
    }
}

enum Outcome {
    Transformed { hash: String },
    Cached,
    Failed(TransformError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILD
// ═══════════════════════════════════════════════════════════════════════════════

pub fn build(config: &BuildConfig) -> BuildReport {
    let sources = discover_sources(&config.src_dir);
    info!(
        src = %config.src_dir.display(),
        out = %config.out_dir.display(),
        files = sources.len(),
        "build start"
    );

    let manifest = config.out_dir.join(CACHE_FILE);
    let mut cache = if config.incremental {
        TransformCache::load(&manifest)
    } else {
        TransformCache::default()
    };
    let options = config.base_options();
    let keys: Vec<String> = sources
        .iter()
        .map(|source| relative_key(&config.src_dir, source))
        .collect();
    let collisions = output_collisions(&config.out_dir, &keys);

    let outcomes: Vec<(String, Outcome)> = sources
        .par_iter()
        .zip(keys.par_iter())
        .map(|(source, key)| {
            let outcome = match collisions.get(key) {
                Some(others) => Outcome::Failed(collision_error(key, others)),
                None => build_one(config, &cache, &options, source, key),
            };
            (key.clone(), outcome)
        })
        .collect();

    let mut report = BuildReport::default();
    for (key, outcome) in outcomes {
        match outcome {
            Outcome::Transformed { hash } => {
                cache.record(key.clone(), hash);
                report.transformed.push(key);
            }
            Outcome::Cached => report.cached.push(key),
            Outcome::Failed(err) => {
                cache.remove(&key);
                report.failed.push(err);
            }
        }
    }

    if config.incremental {
        cache.retain_keys(keys.iter().map(String::as_str));
        if let Err(err) = cache.save(&manifest) {
            warn!(error = %err.message, "failed to save transform cache");
        }
    }

    info!(
        transformed = report.transformed.len(),
        cached = report.cached.len(),
        failed = report.failed.len(),
        "build done"
    );
    report
}

/// Keys sharing an output path with other sources, mapped to those sources.
fn output_collisions(out_dir: &Path, keys: &[String]) -> HashMap<String, Vec<String>> {
    let mut by_output: BTreeMap<PathBuf, Vec<&String>> = BTreeMap::new();
    for key in keys {
        by_output.entry(output_path(out_dir, key)).or_default().push(key);
    }

    let mut collisions = HashMap::new();
    for group in by_output.values().filter(|group| group.len() > 1) {
        for &key in group {
            let others = group
                .iter()
                .filter(|other| **other != key)
                .map(|other| other.to_string())
                .collect();
            collisions.insert(key.clone(), others);
        }
    }
    collisions
}

fn collision_error(key: &str, others: &[String]) -> TransformError {
    warn!(file = key, others = ?others, "output path collision");
    TransformError::new(
        ErrorKind::Io,
        format!("Output of `{}` collides with `{}`", key, others.join("`, `")),
        0,
        key,
    )
}

fn build_one(
    config: &BuildConfig,
    cache: &TransformCache,
    options: &TransformOptions,
    source: &Path,
    key: &str,
) -> Outcome {
    let output = output_path(&config.out_dir, key);
    let text = match fs::read_to_string(source) {
        Ok(text) => text,
        Err(e) => return Outcome::Failed(TransformError::io(&e, key)),
    };

    let options = options.for_path(source);
    let hash = TransformCache::compute_hash(&text, &options);
    if config.incremental && cache.is_fresh(key, &hash, &output) {
        debug!(file = key, "unchanged, reusing output");
        return Outcome::Cached;
    }

    let code = match transform_with_options(&text, key, &options) {
        Ok(code) => code,
        Err(err) => return Outcome::Failed(err),
    };
    match write_output(&output, &code) {
        Ok(()) => Outcome::Transformed { hash },
        Err(e) => Outcome::Failed(TransformError::io(&e, &output.to_string_lossy())),
    }
}

fn write_output(path: &Path, code: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, code)
}

fn relative_key(root: &Path, source: &Path) -> String {
    source
        .strip_prefix(root)
        .unwrap_or(source)
        .to_string_lossy()
        .replace('\\', "/")
}

/// `<out>/<key>` with the extension replaced by `.js`.
fn output_path(out_dir: &Path, key: &str) -> PathBuf {
    out_dir.join(key).with_extension("js")
}
