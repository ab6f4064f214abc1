//! Batch build tests against temporary source trees.

use std::fs;
use std::path::Path;

use crate::batch::{build, BuildConfig};
use crate::cache::CACHE_FILE;
use crate::error::ErrorKind;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn test_build_writes_outputs_per_extension() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "app.jsx", "export default <main/>;");
    write(src.path(), "lib/util.js", "export const id = x => x;");
    write(src.path(), "lib/esm.mjs", "x = a <b;");
    write(src.path(), "README.md", "# docs");

    let report = build(&BuildConfig::new(src.path(), out.path()));

    assert!(report.is_success(), "{:?}", report.failed);
    assert_eq!(report.transformed, vec!["app.jsx", "lib/esm.mjs", "lib/util.js"]);
    assert!(report.cached.is_empty());

    assert_eq!(
        read(out.path(), "app.js"),
        "const { _VV, _VVT, _VVD } = require('flare/ctr');exports.default = _VV(\"main\", [], []);\n"
    );
    assert_eq!(
        read(out.path(), "lib/util.js"),
        "/*export*/ const id = x => x;\nexports.id = id;\n"
    );
    assert_eq!(read(out.path(), "lib/esm.js"), "x = a <b;\n");
    assert!(!out.path().join("README.js").exists());
}

#[test]
fn test_failures_do_not_stop_other_files() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "a.jsx", "x = <a></b>;");
    write(src.path(), "b.js", "y = 1;");
    write(src.path(), "c.js", "z = 'open");

    let report = build(&BuildConfig::new(src.path(), out.path()));

    assert!(!report.is_success());
    assert_eq!(report.transformed, vec!["b.js"]);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].path, "a.jsx");
    assert_eq!(report.failed[0].kind, ErrorKind::Structural);
    assert_eq!(report.failed[1].path, "c.js");
    assert_eq!(report.failed[1].kind, ErrorKind::Lexical);
    assert_eq!(report.total(), 3);
    assert!(!out.path().join("a.js").exists());
    assert_eq!(read(out.path(), "b.js"), "y = 1;\n");
}

#[test]
fn test_incremental_rebuild_reuses_unchanged_outputs() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "a.js", "a = 1;");
    write(src.path(), "b.js", "b = 1;");
    let config = BuildConfig::new(src.path(), out.path());

    let first = build(&config);
    assert_eq!(first.transformed.len(), 2);
    assert!(out.path().join(CACHE_FILE).exists());

    let second = build(&config);
    assert!(second.transformed.is_empty());
    assert_eq!(second.cached, vec!["a.js", "b.js"]);

    write(src.path(), "b.js", "b = 2;");
    fs::remove_file(out.path().join("a.js")).unwrap();
    let third = build(&config);
    assert_eq!(third.transformed, vec!["a.js", "b.js"]);
    assert_eq!(read(out.path(), "b.js"), "b = 2;\n");
}

#[test]
fn test_option_change_invalidates_cache() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "a.js", "a = 1; // note");
    let mut config = BuildConfig::new(src.path(), out.path());

    build(&config);
    config.strip_comments = true;
    let report = build(&config);
    assert_eq!(report.transformed, vec!["a.js"]);
    assert_eq!(read(out.path(), "a.js"), "a = 1; \n");
}

#[test]
fn test_non_incremental_always_transforms() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "a.js", "a = 1;");
    let mut config = BuildConfig::new(src.path(), out.path());
    config.incremental = false;

    build(&config);
    let report = build(&config);
    assert_eq!(report.transformed, vec!["a.js"]);
    assert!(!out.path().join(CACHE_FILE).exists());
}

#[test]
fn test_config_from_json_file_resolves_relative_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("jsxc.json");
    fs::write(
        &config_path,
        r#"{ "srcDir": "src", "outDir": "dist", "stripComments": true, "helperModule": "ui/ctr" }"#,
    )
    .unwrap();

    let config = BuildConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.src_dir, dir.path().join("src"));
    assert_eq!(config.out_dir, dir.path().join("dist"));
    assert!(config.strip_comments);
    assert!(config.incremental);
    assert_eq!(config.helper_module, "ui/ctr");

    write(dir.path(), "src/v.jsx", "<b/>");
    let report = build(&config);
    assert!(report.is_success());
    assert!(read(dir.path(), "dist/v.js").starts_with("const { _VV, _VVT, _VVD } = require('ui/ctr');"));
}

#[test]
fn test_bad_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("jsxc.json");
    fs::write(&config_path, r#"{ "srcDir": 1 }"#).unwrap();

    let err = BuildConfig::from_json_file(&config_path).unwrap_err();
    assert!(err.message.starts_with("Invalid build config"), "{}", err.message);

    let missing = BuildConfig::from_json_file(&dir.path().join("none.json")).unwrap_err();
    assert_eq!(missing.kind, ErrorKind::Io);
}

#[test]
fn test_colliding_outputs_fail_without_writing() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(src.path(), "a.js", "a = 1;");
    write(src.path(), "a.jsx", "a = <b/>;");
    write(src.path(), "c.js", "c = 1;");
    let config = BuildConfig::new(src.path(), out.path());

    let report = build(&config);
    assert_eq!(report.transformed, vec!["c.js"]);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].path, "a.js");
    assert_eq!(report.failed[1].path, "a.jsx");
    assert_eq!(report.failed[0].kind, ErrorKind::Io);
    assert!(report.failed[0].message.contains("a.jsx"), "{}", report.failed[0].message);
    assert!(!out.path().join("a.js").exists());

    let rebuild = build(&config);
    assert_eq!(rebuild.cached, vec!["c.js"]);
    assert_eq!(rebuild.failed.len(), 2);

    fs::remove_file(src.path().join("a.jsx")).unwrap();
    let fixed = build(&config);
    assert_eq!(fixed.transformed, vec!["a.js"]);
    assert_eq!(read(out.path(), "a.js"), "a = 1;\n");
}
