//! `argot`: parse a token list against a JSON parser specification.
//!
//! The binary owns every terminal concern the library refuses to: printing
//! help/version text, reporting parse errors, and choosing exit codes.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use argot::{Action, ArgSpec, Nargs, ParseOutcome, ParserConfig, Value};
use argot_spec::SpecDoc;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    init_tracing();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    match run(&argv) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// The binary's own argument surface, declared with the library it ships.
fn own_config() -> ParserConfig {
    ParserConfig::new()
        .description("Parse a token list against a JSON parser specification.")
        .epilog("Put -- before the tokens so they reach the loaded specification untouched.")
        .version(env!("CARGO_PKG_VERSION"))
        .flag(
            ArgSpec::flag(["-p", "--print-help"])
                .action(Action::StoreTrue)
                .help("Render the specification's help text instead of parsing"),
        )
        .flag(
            ArgSpec::flag(["-V", "--version"])
                .action(Action::Version)
                .help("Show version information"),
        )
        .positional(
            ArgSpec::positional("spec")
                .required()
                .value_name("SPEC")
                .help("Path to the JSON specification"),
        )
        .positional(
            ArgSpec::positional("tokens")
                .nargs(Nargs::Remainder)
                .value_name("TOKENS")
                .help("Tokens to parse against the specification"),
        )
}

fn run(argv: &[String]) -> Result<ExitCode> {
    let own = match argot::parse(&own_config(), argv)? {
        ParseOutcome::Matches(m) => m,
        ParseOutcome::Help(text) | ParseOutcome::Version(text) => {
            print!("{text}");
            return Ok(ExitCode::SUCCESS);
        }
    };

    let path = own.get_str("spec").context("spec path missing")?;
    tracing::debug!(path, "loading specification");
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let doc = SpecDoc::from_json(&raw).with_context(|| format!("parsing {path}"))?;
    let config = doc.to_config()?;

    if own.is_present("print-help") {
        print!("{}", argot::help::render(&config));
        return Ok(ExitCode::SUCCESS);
    }

    let tokens: Vec<String> = match own.get("tokens") {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    match argot::parse(&config, &tokens) {
        Ok(ParseOutcome::Matches(result)) => {
            println!("{}", serde_json::to_string_pretty(&mapping_to_json(&result))?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(ParseOutcome::Help(text)) | Ok(ParseOutcome::Version(text)) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::from(2))
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Str(s) => serde_json::Value::from(s.as_str()),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(x) => serde_json::Value::from(*x),
        Value::Bool(b) => serde_json::Value::from(*b),
        Value::List(items) => serde_json::Value::from(
            items.iter().map(value_to_json).collect::<Vec<_>>(),
        ),
    }
}

fn mapping_to_json(matches: &argot::Matches) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (key, value) in matches.iter() {
        out.insert(key.to_string(), value_to_json(value));
    }
    serde_json::Value::Object(out)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
