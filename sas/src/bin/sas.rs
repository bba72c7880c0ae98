//! The `sas` CLI: batch-runs a script file, or reads statements
//! interactively from stdin when none is given (spec §6 "CLI surface").

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use sas::core::Environment;
use sas::repl::{LineOutcome, Repl};
use sas::{run_program, StdoutListing};
use sas_parser::Parser as SasParser;

/// An interpreter for a subset of the SAS language.
#[derive(ClapParser)]
#[command(author, version, about)]
struct Cli {
    /// Script to run. Omit to read statements interactively from stdin.
    script: Option<std::path::PathBuf>,

    /// Overrides `RUST_LOG` for this run.
    #[arg(long)]
    log_level: Option<String>,

    /// Seeds the `LINESIZE` option.
    #[arg(long)]
    linesize: Option<u32>,

    /// Seeds the `PAGESIZE` option.
    #[arg(long)]
    pagesize: Option<u32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_logging(cli.log_level.as_deref());

    let mut env = Environment::new();
    if let Some(linesize) = cli.linesize {
        env.set_option("LINESIZE", linesize.to_string());
    }
    if let Some(pagesize) = cli.pagesize {
        env.set_option("PAGESIZE", pagesize.to_string());
    }

    match cli.script {
        Some(path) => run_batch(&path, &mut env),
        None => run_interactive(&mut env),
    }
}

fn install_logging(log_level: Option<&str>) {
    let filter = log_level
        .map(tracing_subscriber::EnvFilter::new)
        .unwrap_or_else(|| {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_batch(path: &std::path::Path, env: &mut Environment) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("sas: failed to read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut parser = match SasParser::new_with_source(&source) {
        Ok(parser) => parser,
        Err(err) => {
            eprintln!("sas: {err}");
            return ExitCode::FAILURE;
        }
    };
    let (program, errors) = parser.parse_program();
    for err in &errors {
        eprintln!("sas: {err}");
    }
    if !errors.is_empty() {
        return ExitCode::FAILURE;
    }

    let mut listing = StdoutListing;
    match run_program(&program, env, &mut listing) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sas: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_interactive(env: &mut Environment) -> ExitCode {
    let mut repl = Repl::new();
    let mut listing = StdoutListing;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("sas: {err}");
                return ExitCode::FAILURE;
            }
        };
        match repl.feed_line(&line, env, &mut listing) {
            LineOutcome::Ran => {}
            LineOutcome::SyntaxError(message) => eprintln!("sas: {message}"),
        }
        let _ = stdout.flush();
    }
    ExitCode::SUCCESS
}
