//! `predicate-verify` — a small conformance-checking CLI (§4.11), in the
//! spirit of the teacher's `rift-verify`: read a fixture, print a verdict.
//! Not a wire protocol; the library never requires this binary.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use predicate_engine::{canonical_json, evaluate, EvalConfig, TracingLogger, Value};
use serde::Deserialize;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Evaluate a predicate against a fixture request and print the verdict.
#[derive(Parser, Debug)]
#[command(name = "predicate-verify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON fixture file of the shape `{"predicate": ..., "request": ...}`.
    /// Reads stdin when omitted.
    #[arg(value_name = "FIXTURE")]
    fixture: Option<PathBuf>,

    /// Print the normalized expected/actual trees alongside the verdict.
    #[arg(short, long)]
    verbose: bool,

    /// Enable `inject` support for this run.
    #[arg(long)]
    allow_inject: bool,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    predicate: serde_json::Value,
    request: serde_json::Value,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let raw = match &args.fixture {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("{RED}error{RESET}: reading {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buf) {
                eprintln!("{RED}error{RESET}: reading stdin: {e}");
                return ExitCode::FAILURE;
            }
            buf
        }
    };

    let fixture: Fixture = match serde_json::from_str(&raw) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{RED}error{RESET}: parsing fixture: {e}");
            return ExitCode::FAILURE;
        }
    };

    let predicate = Value::from(fixture.predicate);
    let request = Value::from(fixture.request);

    let cfg = EvalConfig {
        inject_enabled: args.allow_inject,
        ..EvalConfig::default()
    };
    let mut imposter_state = Value::Null;

    match evaluate(&predicate, &request, &cfg, &TracingLogger, &mut imposter_state) {
        Ok(true) => {
            println!("{GREEN}true{RESET}");
            if args.verbose {
                print_verbose(&predicate, &request);
            }
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("{RED}false{RESET}");
            if args.verbose {
                print_verbose(&predicate, &request);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{RED}error{RESET}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_verbose(predicate: &Value, request: &Value) {
    println!("{DIM}predicate:{RESET} {}", canonical_json(predicate));
    println!("{DIM}request:{RESET}   {}", canonical_json(request));
}
