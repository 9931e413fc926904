//! Binary entry point for the tugsema CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Walk every file of the first module and print JSON events
//! tugsema walk tree.json
//!
//! # Walk one declaration, human-readable
//! tugsema walk tree.json --root decl:4 --format text
//!
//! # Stop after the first three references
//! tugsema walk tree.json --stop-after 3
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugsema::cli::{render_text, run_walk, RootSpec, WalkOptions};
use tugsema_core::error::{OutputErrorCode, SemaError};
use tugsema_core::output::{emit_response, ErrorResponse};
use tugsema_ide::CollectorOptions;

// ============================================================================
// CLI Structure
// ============================================================================

/// Semantic source-entity traversal.
///
/// Reads a resolved tree and reports every entity occurrence in source
/// order. Output is JSON by default.
#[derive(Parser, Debug)]
#[command(name = "tugsema", version, about = "Semantic source-entity traversal")]
struct Cli {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the walk command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum WalkFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// One `file:line:col kind name` line per located event.
    Text,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Walk a tree and report every event in traversal order.
    Walk {
        /// Path to the tree, serialized as JSON.
        tree: PathBuf,
        /// Where to start: file:N, module:N, decl:N, stmt:N, expr:N or pattern:N.
        #[arg(long, value_parser = parse_root)]
        root: Option<RootSpec>,
        /// Do not descend into generic parameter lists.
        #[arg(long)]
        no_generic_params: bool,
        /// Walk inactive conditional-compilation clauses too.
        #[arg(long)]
        inactive_regions: bool,
        /// Cancel the walk after this many reference events.
        #[arg(long)]
        stop_after: Option<usize>,
        /// Output format.
        #[arg(long, value_enum, default_value = "json")]
        format: WalkFormat,
    },
}

fn parse_root(s: &str) -> Result<RootSpec, String> {
    s.parse().map_err(|e: tugsema::cli::RootSpecError| e.to_string())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), SemaError> {
    match cli.command {
        Command::Walk {
            tree,
            root,
            no_generic_params,
            inactive_regions,
            stop_after,
            format,
        } => {
            if stop_after == Some(0) {
                return Err(SemaError::invalid_args("--stop-after must be at least 1"));
            }
            let options = WalkOptions {
                root,
                collector: CollectorOptions {
                    walk_generic_params: !no_generic_params,
                    walk_inactive_regions: inactive_regions,
                    stop_after_references: stop_after,
                },
            };
            execute_walk(&tree, &options, format)
        }
    }
}

/// Execute walk command.
fn execute_walk(tree: &Path, options: &WalkOptions, format: WalkFormat) -> Result<(), SemaError> {
    let response = run_walk(tree, options)?;

    let mut stdout = io::stdout();
    match format {
        WalkFormat::Json => emit_response(&response, &mut stdout)?,
        WalkFormat::Text => write!(stdout, "{}", render_text(&response))?,
    }
    let _ = stdout.flush();
    Ok(())
}
