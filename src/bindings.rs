//! Node bindings, built with the `napi` feature.

use napi_derive::napi;

use crate::batch::{build, BuildConfig};
use crate::discovery::discover_sources;
use crate::transform::{self, TransformOptions};

fn to_napi_error(err: crate::error::TransformError) -> napi::Error {
    napi::Error::from_reason(err.to_string())
}

/// Extended-dialect transform; throws a `SyntaxError: ...\nline:N, path` message.
#[napi]
pub fn transform_native(
    source: String,
    path: String,
    strip_comments: Option<bool>,
) -> napi::Result<String> {
    transform::transform(&source, &path, strip_comments.unwrap_or(false)).map_err(to_napi_error)
}

#[napi]
pub fn transform_plain_native(
    source: String,
    path: String,
    strip_comments: Option<bool>,
) -> napi::Result<String> {
    transform::transform_plain(&source, &path, strip_comments.unwrap_or(false))
        .map_err(to_napi_error)
}

/// Transform with a camelCase options object (`extended`, `stripComments`,
/// `helperModule`).
#[napi]
pub fn transform_with_options_native(
    source: String,
    path: String,
    options_json: serde_json::Value,
) -> napi::Result<String> {
    let options: TransformOptions = serde_json::from_value(options_json)
        .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?;
    transform::transform_with_options(&source, &path, &options).map_err(to_napi_error)
}

#[napi]
pub fn discover_sources_native(base_dir: String) -> Vec<String> {
    discover_sources(std::path::Path::new(&base_dir))
        .into_iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect()
}

/// Runs a batch build from a camelCase `BuildConfig` and returns the report.
#[napi]
pub fn build_native(config_json: serde_json::Value) -> napi::Result<serde_json::Value> {
    let config: BuildConfig = serde_json::from_value(config_json)
        .map_err(|e| napi::Error::from_reason(format!("Config parse error: {}", e)))?;
    let report = build(&config);
    serde_json::to_value(report)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
