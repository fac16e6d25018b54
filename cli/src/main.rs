use std::fs;
use std::path::{Path, PathBuf};

use argmatch_core::{Grammar, match_argv, validate_grammar};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argmatch")]
#[command(about = "Match argument vectors against declared command grammars")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match tokens against a grammar and print the projected record.
    Match(MatchArgs),
    /// Validate one or more grammar JSON files.
    Validate(ValidateArgs),
    /// Print the projection of a grammar without matching anything.
    Project(ProjectArgs),
}

#[derive(Debug, Args)]
struct MatchArgs {
    /// Path to the grammar JSON file.
    #[arg(long)]
    grammar: PathBuf,
    /// Output format for the projected record (default: json).
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Argument tokens to match, in order, excluding the program name.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Grammar JSON files to validate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Path to the grammar JSON file.
    #[arg(long)]
    grammar: PathBuf,
    /// Output format for the projected record (default: json).
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Match(args) => run_match(args),
        Command::Validate(args) => run_validate(args),
        Command::Project(args) => run_project(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_match(args: MatchArgs) -> Result<(), String> {
    let mut grammar = load_grammar(&args.grammar)?;
    match_argv(&mut grammar, &args.tokens).map_err(|err| err.to_string())?;
    print_record(&grammar.project(), args.format)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let mut failures = 0usize;
    for path in &args.inputs {
        let raw = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
        let grammar: Grammar = match serde_json::from_str(&raw) {
            Ok(grammar) => grammar,
            Err(err) => {
                eprintln!("{}: invalid grammar JSON: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        let errors = validate_grammar(&grammar);
        if errors.is_empty() {
            println!("{}: ok", path.display());
        } else {
            for error in &errors {
                eprintln!("{}: {error}", path.display());
            }
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} grammar file(s) failed validation"));
    }
    Ok(())
}

fn run_project(args: ProjectArgs) -> Result<(), String> {
    let grammar = load_grammar(&args.grammar)?;
    print_record(&grammar.project(), args.format)
}

/// Loads and validates a grammar file; matching a malformed table is
/// never attempted.
fn load_grammar(path: &Path) -> Result<Grammar, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    let grammar: Grammar = serde_json::from_str(&raw)
        .map_err(|err| format!("Invalid grammar JSON in '{}': {err}", path.display()))?;

    let errors = validate_grammar(&grammar);
    if let Some(error) = errors.first() {
        return Err(format!("Invalid grammar in '{}': {error}", path.display()));
    }
    Ok(grammar)
}

fn print_record(record: &Map<String, Value>, format: CliOutputFormat) -> Result<(), String> {
    let raw = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(record)
            .map_err(|err| format!("Failed to encode record as JSON: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(record)
            .map_err(|err| format!("Failed to encode record as YAML: {err}"))?,
    };
    println!("{}", raw.trim_end());
    Ok(())
}
