//! Shape Schema CLI
//!
//! Command-line interface for validating payloads against specifications,
//! generating examples and summaries, and linting specification files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use shape_schema::{check_file, lint, load_json_auto, CheckError, FileStatus, Schema, Severity};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shape-schema")]
#[command(about = "Validate, coerce and describe values against shape specifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a payload and print its normalized form
    Validate {
        /// Specification source: file path or URL (http:// or https://)
        schema: String,

        /// Payload file to validate
        payload: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file for the normalized value (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a synthetic example value
    Example {
        /// Specification source: file path or URL
        schema: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print a summary document describing the specification
    Summary {
        /// Specification source: file path or URL
        schema: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lint specification files (syntax, patterns, bounds, unknown constraints)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate {
            schema,
            payload,
            json,
            pretty,
            output,
        } => run_validate(&schema, &payload, json, pretty, output),
        Commands::Example { schema, pretty } => {
            load_schema(&schema).and_then(|s| match s.example() {
                Some(value) => print_json(&value, pretty),
                None => {
                    println!("undefined");
                    Ok(())
                }
            })
        }
        Commands::Summary { schema, pretty } => {
            load_schema(&schema).and_then(|s| print_json(&s.summary(), pretty))
        }
        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load_schema(source: &str) -> Result<Schema, u8> {
    let spec = load_json_auto(source).map_err(|e| {
        eprintln!("Error: loading schema: {}", e);
        e.exit_code() as u8
    })?;
    Ok(Schema::from_json(&spec))
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), u8> {
    println!("{}", to_json(value, pretty)?);
    Ok(())
}

fn run_validate(
    schema_source: &str,
    payload_path: &Path,
    json_output: bool,
    pretty: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    match check_file(schema_source, payload_path) {
        Ok(value) => {
            let rendered = if json_output {
                to_json(&serde_json::json!({ "valid": true, "value": value }), pretty)?
            } else {
                match &value {
                    Some(value) => to_json(value, pretty)?,
                    None => "undefined".to_string(),
                }
            };

            match output {
                Some(path) => std::fs::write(&path, &rendered).map_err(|e| {
                    eprintln!("Error writing to {}: {}", path.display(), e);
                    3u8
                })?,
                None => println!("{}", rendered),
            }
            Ok(())
        }
        Err(CheckError::Invalid(err)) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "error": err
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                eprintln!("  {}: {}", err.route(), err);
            }
            Err(1)
        }
        Err(err @ CheckError::Load(_)) => {
            report_error(json_output, &err.to_string());
            Err(err.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        print_json(&result, true)?;
    } else {
        // Text output
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!("  {} {}", status_icon, file_result.file.display());
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.is_ok() && (!strict || result.warnings == 0) {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.is_ok() && (!strict || result.warnings == 0) {
        Ok(())
    } else {
        Err(1)
    }
}
