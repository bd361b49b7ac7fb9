//! Binary entry point for the anninsert CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Synthesize insertions for a scene (JSON response on stdout)
//! anninsert synthesize --scene scene.json --constructors ctors.json
//!
//! # Same, as one line per insertion
//! anninsert synthesize --scene scene.json --format text
//!
//! # Which simple names are ambiguous?
//! anninsert ambiguity --scene scene.json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use anninsert::cli::{run_ambiguity, run_synthesize, OutputFormat, SynthesizeArgs};
use anninsert::config::{CliOverrides, UnknownConstructorPolicy};
use anninsert::error::CliError;
use anninsert::output::{emit_response, ErrorInfo, ErrorResponse};
use anninsert_core::error::OutputErrorCode;

// ============================================================================
// CLI Structure
// ============================================================================

/// Synthesize annotation insertions from a scene.
#[derive(Parser, Debug)]
#[command(name = "anninsert", version, about = "Synthesize annotation insertions from a scene")]
struct Cli {
    /// Log level for tracing output.
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

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Turn a scene into ordered insertions.
    Synthesize {
        /// Scene JSON file.
        #[arg(long)]
        scene: PathBuf,
        /// JSON object mapping class names to "declares a constructor".
        #[arg(long)]
        constructors: Option<PathBuf>,
        /// Do not consult constructor information at all.
        #[arg(long)]
        no_bytecode: bool,
        /// What to do when a class's constructors are unknown
        /// (suppress or synthesize).
        #[arg(long)]
        unknown_constructors: Option<UnknownConstructorPolicy>,
        /// Output format.
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// List simple names that must be written fully qualified.
    Ambiguity {
        /// Scene JSON file.
        #[arg(long)]
        scene: PathBuf,
    },
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
            let response = ErrorResponse::new(ErrorInfo::new(error_code, err.to_string()));

            // Errors go to stdout as JSON, like successful responses.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CliError> {
    let output = match cli.command {
        Command::Synthesize {
            scene,
            constructors,
            no_bytecode,
            unknown_constructors,
            format,
        } => run_synthesize(&SynthesizeArgs {
            scene,
            constructors,
            overrides: CliOverrides {
                unknown_constructors,
                no_bytecode,
            },
            format,
        })?,
        Command::Ambiguity { scene } => run_ambiguity(&scene)?,
    };

    let mut stdout = io::stdout();
    stdout.write_all(output.as_bytes()).map_err(CliError::Output)?;
    stdout.flush().map_err(CliError::Output)?;
    Ok(())
}
