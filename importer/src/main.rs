use anyhow::Result;
use clap::{Parser, ValueEnum};
use ingest::{import, ImportOptions};
use logging::LogFormat;
use std::path::PathBuf;
use std::time::Instant;

mod config;
mod logging;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Parser)]
#[command(name = "scan-import", version, about = "Import scanner JSON / JSON-Lines output into a SQLite database")]
struct Cli {
    /// Scanner output file, or a directory whose newest file is imported
    input: PathBuf,
    /// SQLite database to write (created with its parent directory if missing)
    db: PathBuf,
    /// Optional config file (YAML). If omitted, loads ./importer.yaml if present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep the source file after a successful import
    #[arg(long, default_value_t = false)]
    keep_source: bool,
    /// Scanner version recorded on the scan row
    #[arg(long)]
    scanner_version: Option<String>,
    /// Log filter (e.g. warn, info, ingest=debug). RUST_LOG overrides.
    #[arg(long)]
    log_level: Option<String>,
    /// Log line format on stderr (default: text)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
    /// Summary format on stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref()).unwrap_or_default();

    let level = cli.log_level.as_deref().or(cfg.log_level.as_deref()).unwrap_or("warn");
    let log_format = cli.log_format.or(cfg.log_format).unwrap_or_default();
    logging::init_tracing(level, log_format)?;
    tracing::debug!(version = importer_core::version(), "scan-import starting");

    let opts = ImportOptions {
        keep_source: cli.keep_source || cfg.keep_source,
        scanner_version: cli.scanner_version.or(cfg.scanner_version),
    };

    importer_core::fs::ensure_parent_dir(&cli.db)?;

    let started = Instant::now();
    let outcome = import(&cli.input, &cli.db, &opts)?;
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "import finished");

    match cli.format {
        OutputFormat::Text => println!("{}", outcome),
        OutputFormat::Json => println!("{}", serde_json::to_string(&outcome)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_log_format_is_a_usage_error() {
        let err = Cli::try_parse_from(["scan-import", "in.jsonl", "out.db", "--log-format", "xml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn log_format_parses() {
        let cli = Cli::try_parse_from(["scan-import", "in.jsonl", "out.db", "--log-format", "json"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn positionals_are_exactly_two() {
        assert!(Cli::try_parse_from(["scan-import", "in.jsonl"]).is_err());
        assert!(Cli::try_parse_from(["scan-import", "in.jsonl", "out.db", "extra"]).is_err());
    }
}
