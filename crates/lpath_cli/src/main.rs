use anyhow::{Context, Result};
use clap::Parser;
use lpath_core::{Compiler, DEFAULT_MAX_DEPTH, Evaluator, Options};
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

/// lpath - query and edit JSON documents with path expressions
#[derive(Parser, Debug)]
#[command(name = "lpath")]
#[command(version)]
#[command(about = "Query and edit JSON documents with path expressions", long_about = None)]
struct Cli {
    /// Path query, e.g. "$.store.book[?(@.price < 10)].title"
    query: String,

    /// Input JSON file (reads from stdin if omitted)
    file: Option<String>,

    /// Print the location of each match instead of its value
    #[arg(long, conflicts_with_all = ["exists", "set", "remove"])]
    paths: bool,

    /// Print whether anything matches; exit with status 1 when nothing does
    #[arg(long, conflicts_with_all = ["set", "remove"])]
    exists: bool,

    /// Replace the matched values (or create the last step) and print the document
    #[arg(long, value_name = "JSON", conflicts_with = "remove")]
    set: Option<String>,

    /// Delete the matched values and print the document
    #[arg(long)]
    remove: bool,

    /// Print the canonical text of the compiled path and exit
    #[arg(long, conflicts_with_all = ["paths", "exists", "set", "remove"])]
    canonical: bool,

    /// Print JSON on a single line
    #[arg(short, long)]
    compact: bool,

    /// Maximum filter nesting and deep-scan document depth
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("error reading file '{path}'"))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("error reading stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
    .context("error serializing output")?;
    println!("{output}");
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let options = Options::new().max_depth(cli.max_depth);
    let path = Compiler::with_options(options)
        .compile(&cli.query)
        .context("error compiling path")?;

    if cli.canonical {
        println!("{}", path.to_canonical_string());
        return Ok(ExitCode::SUCCESS);
    }

    let input = read_input(cli.file.as_deref())?;
    let mut json: Value = serde_json::from_str(&input).context("error parsing JSON")?;
    let evaluator = Evaluator::with_options(options);

    if cli.exists {
        let found = evaluator.contains(&path, &json)?;
        println!("{found}");
        return Ok(if found {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    if let Some(raw) = &cli.set {
        let value: Value = serde_json::from_str(raw).context("error parsing --set value")?;
        let written = evaluator.set(&path, &mut json, || value.clone())?;
        debug!("wrote {written} value(s)");
        print_json(&json, cli.compact)?;
        return Ok(ExitCode::SUCCESS);
    }

    if cli.remove {
        let removed = evaluator.remove(&path, &mut json)?;
        debug!("removed {removed} value(s)");
        print_json(&json, cli.compact)?;
        return Ok(ExitCode::SUCCESS);
    }

    let matches = evaluator.query(&path, &json)?;
    let output = if cli.paths {
        Value::from(
            matches
                .iter()
                .map(|m| m.location.to_string())
                .collect::<Vec<_>>(),
        )
    } else {
        Value::Array(matches.iter().map(|m| m.value.clone()).collect())
    };
    print_json(&output, cli.compact)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lpath: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_and_file() {
        let cli = Cli::try_parse_from(["lpath", "$.a", "doc.json"]).unwrap();
        assert_eq!(cli.query, "$.a");
        assert_eq!(cli.file.as_deref(), Some("doc.json"));
        assert_eq!(cli.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!cli.compact);
    }

    #[test]
    fn test_parse_set_and_depth() {
        let cli =
            Cli::try_parse_from(["lpath", "--set", "1", "--max-depth", "8", "$.a"]).unwrap();
        assert_eq!(cli.set.as_deref(), Some("1"));
        assert_eq!(cli.max_depth, 8);
    }

    #[test]
    fn test_conflicting_modes() {
        assert!(Cli::try_parse_from(["lpath", "--set", "1", "--remove", "$.a"]).is_err());
        assert!(Cli::try_parse_from(["lpath", "--paths", "--exists", "$.a"]).is_err());
        assert!(Cli::try_parse_from(["lpath", "--canonical", "--remove", "$.a"]).is_err());
        assert!(Cli::try_parse_from(["lpath", "--canonical", "--set", "1", "$.a"]).is_err());
        assert!(Cli::try_parse_from(["lpath", "--canonical", "--paths", "$.a"]).is_err());
        assert!(Cli::try_parse_from(["lpath", "--canonical", "-c", "$.a"]).is_ok());
    }

    #[test]
    fn test_missing_query() {
        assert!(Cli::try_parse_from(["lpath"]).is_err());
    }
}
