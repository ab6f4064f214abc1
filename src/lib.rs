//! # jsx-native
//!
//! Single-pass transpiler from an extended JavaScript dialect to plain,
//! directly executable JavaScript.
//!
//! ## Dialect
//!
//! Ordinary JS plus:
//!
//! - element literals: `<div a="1">Hi {name}</div>` becomes
//!   `_VV("div", [[["a"],"1"]], [_VVT("Hi "),_VVD(name)])`,
//! - simplified modules: `import x from "m"` becomes `const x = require("m")`
//!   and exported names are collected into `exports.name = local;`,
//! - class field initializers, hoisted into `Object.assign(Class.prototype, {...})`,
//! - `event onName;` accessor sugar inside classes.
//!
//! ## Output Invariants
//!
//! 1. **No tree**: code is written while parsing. Only hoisted fields and
//!    export bindings are buffered, and they are appended after the body.
//! 2. **Lines are preserved**: source line N is output line N. Rewritten
//!    constructs carry the line breaks of the text they replace.
//! 3. **Pass-through is lossless**: anything that is not rewritten,
//!    including comments and whitespace, reaches the output unchanged.
//! 4. **Fail fast**: the first malformed construct aborts with one
//!    [`TransformError`] carrying a 1-based line and the file path.

#[cfg(feature = "napi")]
mod bindings;

mod batch;
mod cache;
mod class_fields;
mod cursor;
mod discovery;
mod document;
mod error;
mod expression;
mod modules;
mod parser;
mod scanner;
mod sink;
mod snippets;
mod template;
mod token;
mod transform;
mod xml;

#[cfg(test)]
mod batch_tests;
#[cfg(test)]
mod class_field_tests;

#[cfg(feature = "napi")]
pub use bindings::{
    build_native, discover_sources_native, transform_native, transform_plain_native,
    transform_with_options_native,
};

pub use batch::{build, BuildConfig, BuildReport};
pub use cache::{TransformCache, CACHE_FILE};
pub use cursor::Cursor;
pub use discovery::discover_sources;
pub use error::{ErrorKind, Result, TransformError};
pub use scanner::Scanner;
pub use sink::{OutputSink, TriviaMode};
pub use snippets::DEFAULT_HELPER_MODULE;
pub use token::{Location, Token, TokenKind};
pub use transform::{
    transform, transform_file, transform_into, transform_plain, transform_with_options,
    SourceKind, TransformOptions,
};
