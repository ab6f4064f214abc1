//! `jsxc`: command-line front end.
//!
//! ```text
//! jsxc transform app.jsx -o app.js
//! jsxc build src out
//! jsxc build --config jsxc.json
//! ```
//!
//! Logging goes to stderr and is controlled by `JSXC_LOG` or `RUST_LOG`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use jsx_native::{
    build, transform_file, transform_with_options, BuildConfig, TransformError, TransformOptions,
    DEFAULT_HELPER_MODULE,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Transform(#[from] TransformError),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Report Error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),

    #[error("{failed} of {total} files failed")]
    BuildFailed { failed: usize, total: usize },
}

#[derive(Parser)]
#[command(name = "jsxc", version, about = "Transpile extended JavaScript to plain JavaScript")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform one file to stdout or `--output`.
    Transform {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Force plain mode regardless of extension.
        #[arg(long, conflicts_with = "jsx")]
        plain: bool,
        /// Force extended mode regardless of extension.
        #[arg(long)]
        jsx: bool,
        #[arg(long)]
        strip_comments: bool,
        #[arg(long, default_value = DEFAULT_HELPER_MODULE)]
        helper_module: String,
    },
    /// Transform a source tree into an output tree.
    Build {
        src: Option<PathBuf>,
        out: Option<PathBuf>,
        /// JSON build config; positional directories override it.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        strip_comments: bool,
        /// Transform every file even if unchanged.
        #[arg(long)]
        no_cache: bool,
        /// Print the build report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = match std::env::var("JSXC_LOG") {
        Ok(val) => EnvFilter::builder().parse_lossy(val),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main_error(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Transform {
            input,
            output,
            plain,
            jsx,
            strip_comments,
            helper_module,
        } => {
            let options = TransformOptions {
                extended: !plain,
                strip_comments,
                helper_module,
            };
            let code = if plain || jsx {
                let name = input.to_string_lossy();
                let source =
                    fs::read_to_string(&input).map_err(|e| TransformError::io(&e, &name))?;
                transform_with_options(&source, &name, &options)?
            } else {
                transform_file(&input, &options)?
            };

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(path, code)?;
                }
                None => io::stdout().write_all(code.as_bytes())?,
            }
            Ok(())
        }
        Command::Build {
            src,
            out,
            config,
            strip_comments,
            no_cache,
            json,
        } => {
            let mut config = match (config, src, out) {
                (Some(path), src, out) => {
                    let mut config = BuildConfig::from_json_file(&path)?;
                    if let Some(src) = src {
                        config.src_dir = src;
                    }
                    if let Some(out) = out {
                        config.out_dir = out;
                    }
                    config
                }
                (None, Some(src), Some(out)) => BuildConfig::new(src, out),
                (None, _, _) => {
                    return Err(CliError::Usage(
                        "build needs <SRC> <OUT> or --config <FILE>".to_string(),
                    ))
                }
            };
            config.strip_comments |= strip_comments;
            config.incremental &= !no_cache;

            let report = build(&config);
            if json {
                serde_json::to_writer_pretty(io::stdout(), &report)?;
                println!();
            } else {
                for err in &report.failed {
                    eprintln!("{}", err);
                }
                eprintln!(
                    "{} transformed, {} unchanged, {} failed",
                    report.transformed.len(),
                    report.cached.len(),
                    report.failed.len()
                );
            }

            if report.is_success() {
                Ok(())
            } else {
                Err(CliError::BuildFailed {
                    failed: report.failed.len(),
                    total: report.total(),
                })
            }
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    match main_error(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            writeln!(io::stderr(), "{}", err).ok();
            ExitCode::FAILURE
        }
    }
}
