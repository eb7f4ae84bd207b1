//! SPL-C Compiler Front End
//!
//! Parses an SPL-C source file and runs semantic analysis.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use splc::feedback::AnalysisReport;
use splc::frontend::parse_source;
use splc::semantic::{analyze, Analysis};
use splc::utils::SemanticError;

/// SPL-C semantic analyzer
#[derive(Parser, Debug)]
#[command(name = "splc")]
#[command(version = "0.1.0")]
#[command(about = "SPL-C front end - scope, declaration and type-completeness checks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (.spl)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Emit a JSON report instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

/// What to print once analysis succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Summary,
    Check,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Check { input }) => run(input, Mode::Check, cli.json),
        Some(Commands::Version) => {
            println!("splc 0.1.0");
            println!("SPL-C semantic analyzer");
            Ok(true)
        }
        None => match &cli.input {
            Some(input) => run(input, Mode::Summary, cli.json),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: splc <FILE> or splc check <FILE>");
                process::exit(1);
            }
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Analyze one file; `Ok(false)` means errors were reported
fn run(input: &Path, mode: Mode, json: bool) -> Result<bool> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let program = match parse_source(&source) {
        Ok(p) => p,
        Err(e) => {
            let span = e.span();
            eprintln!("Parse error at line {}:{}: {}", span.line, span.column, e);
            return Ok(false);
        }
    };
    info!("parsed {} items from {}", program.items.len(), input.display());

    let mut errors: Vec<SemanticError> = Vec::new();
    let analysis = analyze(&program, &mut errors);
    info!("semantic analysis finished with {} errors", errors.len());

    if json {
        let report = AnalysisReport::new(input.display().to_string(), &analysis, &errors);
        println!("{}", report.to_json());
    } else {
        print_text(&analysis, &errors, mode);
    }

    Ok(errors.is_empty())
}

fn print_text(analysis: &Analysis, errors: &[SemanticError], mode: Mode) {
    for error in errors {
        println!("{}", error);
    }
    if !errors.is_empty() {
        return;
    }

    match mode {
        Mode::Summary => print!("{}", analysis.summary()),
        Mode::Check => println!("No errors found"),
    }
}
