//! json2csv: Flatten JSON files into a single `key,value` CSV
//!
//! Usage:
//!   # Convert every .json file in the current directory
//!   json2csv
//!
//!   # Convert one file to a chosen output
//!   json2csv -i data/users.json -o flat/users.csv
//!
//!   # Dotted keys, plain indices, reject keys that would break the CSV
//!   json2csv -i ./data -s . --index-format '{}' --validate-keys

// Use MiMalloc allocator (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use json2csv::flatten::types::{DEFAULT_INDEX_FORMAT, DEFAULT_MAX_KEY_LENGTH, DEFAULT_SEPARATOR};
use json2csv::input::default_output_path;
use json2csv::logging::{init_logging, LogConfig, LogFormat};
use json2csv::{convert, ConvertOptions, FlattenConfig, IndexFormat};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "json2csv", version)]
#[command(about = "Convert JSON file(s) to a CSV", long_about = None)]
#[command(after_help = "Example: json2csv -i ./data/ -o output.csv")]
struct Args {
    /// Path to a JSON file or directory (default: current directory)
    #[arg(long, short = 'i', value_name = "PATH", default_value = ".")]
    input: PathBuf,

    /// Path for output CSV file (default: output_YYYYMMDD_HHMMSS.csv)
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    /// Separator for nested keys
    #[arg(long, short = 's', default_value = DEFAULT_SEPARATOR)]
    separator: String,

    /// Format for array indices, e.g. '{:04d}', '{}' or '[{:02x}]'
    #[arg(long, default_value = DEFAULT_INDEX_FORMAT)]
    index_format: String,

    /// Validate keys for CSV compatibility
    #[arg(long)]
    validate_keys: bool,

    /// Longest key accepted when validating keys
    #[arg(long, default_value_t = DEFAULT_MAX_KEY_LENGTH)]
    max_key_length: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_format = match args.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_logging(
        &LogConfig::from_verbosity(args.verbose)
            .with_format(log_format)
            .with_ansi(std::io::stderr().is_terminal()),
    );

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let index_format: IndexFormat = args
        .index_format
        .parse()
        .context("Initialization failed")?;
    let config = FlattenConfig::default()
        .with_separator(args.separator)
        .with_index_format(index_format)
        .with_validate_keys(args.validate_keys)
        .with_max_key_length(args.max_key_length);
    config.validate().context("Initialization failed")?;

    let output = match args.output {
        Some(path) => path,
        None => {
            let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
            default_output_path(&cwd, chrono::Local::now().naive_local())
        }
    };

    let options = ConvertOptions {
        input: args.input,
        output,
        config,
    };
    let summary = convert(&options)?;

    println!(
        "Successfully wrote {} rows to {}",
        summary.rows_written,
        summary.output.display()
    );

    Ok(())
}
