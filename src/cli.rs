//! CLI front door.
//!
//! Provides the helpers behind the `anninsert` subcommands:
//! - `synthesize` - turn a scene into insertions (JSON or text)
//! - `ambiguity` - list the simple names that must be written qualified
//!
//! Input files are JSON. The binary resolves configuration and prints what
//! these functions return; all errors are `CliError`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};

use anninsert_core::ambiguity::AmbiguityPolicy;
use anninsert_core::config::{CliOverrides, ResolvedConfig};
use anninsert_core::output::{emit_response, SynthesisResponse, Warning, SCHEMA_VERSION};
use anninsert_core::{synthesize, ConstructorTable, Scene, SynthesisResult};

use crate::error::CliError;

/// Output format for the synthesize command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full JSON response (default).
    #[default]
    Json,
    /// One line per insertion.
    Text,
}

/// Inputs of the synthesize command.
#[derive(Debug, Clone, Default)]
pub struct SynthesizeArgs {
    pub scene: PathBuf,
    /// JSON object of class name to "declares a constructor".
    pub constructors: Option<PathBuf>,
    pub overrides: CliOverrides,
    pub format: OutputFormat,
}

/// Read a scene file.
pub fn load_scene(path: &Path) -> Result<Scene, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let scene = Scene::from_json(&text).map_err(|e| CliError::json(path, e))?;
    debug!(
        path = %path.display(),
        definitions = scene.definitions.len(),
        packages = scene.packages.len(),
        classes = scene.classes.len(),
        "loaded scene"
    );
    Ok(scene)
}

/// Read a constructor table file.
pub fn load_constructor_table(path: &Path) -> Result<ConstructorTable, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
    let table: ConstructorTable =
        serde_json::from_str(&text).map_err(|e| CliError::json(path, e))?;
    debug!(path = %path.display(), classes = table.len(), "loaded constructor table");
    Ok(table)
}

/// Run synthesis with configuration resolved from the process environment.
pub fn run_synthesize(args: &SynthesizeArgs) -> Result<String, CliError> {
    let config = ResolvedConfig::resolve(&args.overrides)?;
    run_synthesize_with(args, &config)
}

/// Run synthesis with an already resolved configuration.
pub fn run_synthesize_with(
    args: &SynthesizeArgs,
    config: &ResolvedConfig,
) -> Result<String, CliError> {
    let scene = load_scene(&args.scene)?;
    let table = match &args.constructors {
        Some(path) => load_constructor_table(path)?,
        None => ConstructorTable::new(),
    };
    info!(
        unknown_constructors = %config.unknown_constructors.value,
        source = ?config.unknown_constructors.source,
        read_bytecode = config.read_bytecode.value,
        "synthesizing"
    );

    let result = synthesize(&scene, &table, &config.synthesis_config())?;
    match args.format {
        OutputFormat::Json => {
            let response = SynthesisResponse::from_result(&result)?;
            to_json(&response)
        }
        OutputFormat::Text => render_text(&result),
    }
}

/// Plain-text listing: one line per insertion, then warnings.
pub fn render_text(result: &SynthesisResult) -> Result<String, CliError> {
    let mut out = String::new();
    for (id, insertion) in result.insertions() {
        let text = result.render(id)?;
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}",
            id,
            insertion.kind(),
            insertion.criteria(),
            text.escape_default()
        );
    }
    for diagnostic in result.diagnostics() {
        let warning = Warning::from(diagnostic);
        let _ = writeln!(out, "warning[{}]: {}", warning.code, warning.message);
    }
    Ok(out)
}

/// Response of the ambiguity command.
#[derive(Debug, Clone, Serialize)]
pub struct AmbiguityResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    pub always_qualify: Vec<String>,
}

/// List the simple names shared by more than one definition in a scene.
pub fn run_ambiguity(scene: &Path) -> Result<String, CliError> {
    let scene = load_scene(scene)?;
    let policy = AmbiguityPolicy::resolve(&scene.definitions);
    let response = AmbiguityResponse {
        status: "ok".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        always_qualify: policy.names().map(String::from).collect(),
    };
    to_json(&response)
}

fn to_json<T: Serialize>(response: &T) -> Result<String, CliError> {
    let mut out = Vec::new();
    emit_response(response, &mut out).map_err(CliError::Output)?;
    String::from_utf8(out).map_err(|e| {
        CliError::Output(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
