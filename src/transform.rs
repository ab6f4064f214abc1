//! # Transform Entry Points
//!
//! Everything above the parser: option handling, extension dispatch, and the
//! string/sink/file front doors. One call transforms one document; nothing is
//! shared between calls, so callers may run any number of them concurrently.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::parser::Parser;
use crate::sink::OutputSink;
use crate::snippets::DEFAULT_HELPER_MODULE;

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-document transform settings.
///
/// Deserializes from camelCase JSON with every key optional:
/// `{ "extended": false, "stripComments": true, "helperModule": "x/ctr" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Element literals, class fields and `event` sugar. Off means plain JS
    /// with only import/export and template handling.
    pub extended: bool,
    pub strip_comments: bool,
    /// Module the element helpers are required from.
    pub helper_module: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            extended: true,
            strip_comments: false,
            helper_module: DEFAULT_HELPER_MODULE.to_string(),
        }
    }
}

impl TransformOptions {
    pub fn extended(strip_comments: bool) -> Self {
        Self {
            strip_comments,
            ..Self::default()
        }
    }

    pub fn plain(strip_comments: bool) -> Self {
        Self {
            extended: false,
            strip_comments,
            ..Self::default()
        }
    }

    /// These options with the mode picked by `path`'s extension. Unknown
    /// extensions keep the current mode.
    pub fn for_path(&self, path: &Path) -> Self {
        let mut options = self.clone();
        if let Some(kind) = SourceKind::from_path(path) {
            options.extended = kind == SourceKind::Jsx;
        }
        options
    }
}

/// Source dialect, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `.jsx`: the extended dialect.
    Jsx,
    /// `.js`, `.mjs`: plain JavaScript.
    Js,
}

impl SourceKind {
    pub const EXTENSIONS: [&'static str; 3] = ["jsx", "js", "mjs"];

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "jsx" => Some(SourceKind::Jsx),
            "js" | "mjs" => Some(SourceKind::Js),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Transforms the extended dialect.
pub fn transform(source: &str, path: &str, strip_comments: bool) -> Result<String> {
    transform_with_options(source, path, &TransformOptions::extended(strip_comments))
}

/// Transforms plain JavaScript: no header, no elements, no class fields.
pub fn transform_plain(source: &str, path: &str, strip_comments: bool) -> Result<String> {
    transform_with_options(source, path, &TransformOptions::plain(strip_comments))
}

pub fn transform_with_options(
    source: &str,
    path: &str,
    options: &TransformOptions,
) -> Result<String> {
    let mut out = String::with_capacity(source.len() + source.len() / 4 + 64);
    transform_into(&mut out, source, path, options)?;
    Ok(out)
}

/// Streams the transform of `source` into `sink`. On error the sink holds a
/// partial output and should be discarded.
pub fn transform_into(
    sink: &mut dyn OutputSink,
    source: &str,
    path: &str,
    options: &TransformOptions,
) -> Result<()> {
    let started = Instant::now();
    debug!(
        path,
        bytes = source.len(),
        extended = options.extended,
        "transform start"
    );

    let result = Parser::new(source, path, options, sink).parse_document();

    match &result {
        Ok(()) => debug!(path, elapsed_us = started.elapsed().as_micros() as u64, "transform done"),
        Err(err) => debug!(path, line = err.line, error = %err.message, "transform failed"),
    }
    result
}

/// Reads and transforms a file, choosing the mode by extension (`.jsx`
/// extended; `.js` and `.mjs` plain). Errors name the file as given.
pub fn transform_file(path: &Path, options: &TransformOptions) -> Result<String> {
    let name = path.to_string_lossy();
    let source = fs::read_to_string(path).map_err(|e| TransformError::io(&e, &name))?;
    transform_with_options(&source, &name, &options.for_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: TransformOptions =
            serde_json::from_str(r#"{ "stripComments": true }"#).unwrap();
        assert!(options.extended);
        assert!(options.strip_comments);
        assert_eq!(options.helper_module, "flare/ctr");
    }

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a/b.jsx")), Some(SourceKind::Jsx));
        assert_eq!(SourceKind::from_path(Path::new("b.mjs")), Some(SourceKind::Js));
        assert_eq!(SourceKind::from_path(Path::new("b.ts")), None);
        assert_eq!(SourceKind::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_for_path_switches_mode() {
        let base = TransformOptions::extended(true);
        assert!(!base.for_path(Path::new("x.js")).extended);
        assert!(base.for_path(Path::new("x.jsx")).extended);
        assert!(base.for_path(Path::new("x.txt")).extended);
        assert!(base.for_path(Path::new("x.js")).strip_comments);
    }
}
