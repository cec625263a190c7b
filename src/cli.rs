//! Command-line entry point.
//!
//! Settings come from (later wins): built-in defaults, `--config <file.toml>`, environment
//! variables (`DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASS`, `DB_NAME`, `PLANILHAS_FOLDER`) and
//! flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use crate::config::{LoaderConfig, StoreBackend};
use crate::execution::{CompositeObserver, FileObserver, LoadObserver, Pipeline, StdErrObserver};
use crate::store::open_store;

/// Load spreadsheet and CSV exports into a relational database.
#[derive(Parser, Debug)]
#[command(name = "sheet-loader", version)]
#[command(about = "Load .xlsx/.xls/.csv files into database tables, one table per sheet and code", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Directory holding the files to load
    #[arg(long = "source-dir", env = "PLANILHAS_FOLDER")]
    pub source_dir: Option<PathBuf>,

    /// Also load files from subdirectories
    #[arg(long = "recursive")]
    pub recursive: bool,

    /// Store backend
    #[arg(long = "backend", value_enum)]
    pub backend: Option<StoreBackend>,

    /// Database host
    #[arg(long = "db-host", env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port (default: 3306)
    #[arg(long = "db-port", env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// Database user
    #[arg(long = "db-user", env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long = "db-pass", env = "DB_PASS", hide_env_values = true)]
    pub db_pass: Option<String>,

    /// Database name
    #[arg(long = "db-name", env = "DB_NAME")]
    pub db_name: Option<String>,

    /// DuckDB database file (duckdb backend)
    #[arg(long = "duckdb-path")]
    pub duckdb_path: Option<PathBuf>,

    /// Rows per insert batch (default: 5000)
    #[arg(long = "batch-size")]
    pub batch_size: Option<usize>,

    /// Force the CSV field delimiter instead of detecting it
    #[arg(long = "delimiter")]
    pub delimiter: Option<char>,

    /// Append progress events to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Write the run report as JSON to this file
    #[arg(long = "report-json")]
    pub report_json: Option<PathBuf>,

    /// Do not print progress to stderr
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose diagnostics (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Resolve the effective configuration: file (if any), then flags/env on top.
    pub fn load_config(&self) -> Result<LoaderConfig> {
        let mut cfg = match &self.config {
            Some(path) => LoaderConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => LoaderConfig::default(),
        };

        if let Some(dir) = &self.source_dir {
            cfg.source_dir = dir.clone();
        }
        cfg.recursive |= self.recursive;
        if let Some(backend) = self.backend {
            cfg.store.backend = backend;
        }
        if let Some(host) = &self.db_host {
            cfg.store.host = Some(host.clone());
        }
        if let Some(port) = self.db_port {
            cfg.store.port = port;
        }
        if let Some(user) = &self.db_user {
            cfg.store.user = Some(user.clone());
        }
        if let Some(pass) = &self.db_pass {
            cfg.store.password = Some(pass.clone());
        }
        if let Some(name) = &self.db_name {
            cfg.store.database = Some(name.clone());
        }
        if let Some(path) = &self.duckdb_path {
            cfg.store.duckdb_path = Some(path.clone());
        }
        if let Some(n) = self.batch_size {
            cfg.batch_size = n;
        }
        if let Some(d) = self.delimiter {
            cfg.csv_delimiter = Some(d);
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

/// Parse arguments from the process and run.
pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

/// Run one load with already-parsed arguments.
///
/// Fails when the run aborts at the precondition stage (store unreachable, no files); failed
/// files or tables are reported but do not fail the command.
pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    let config = cli.load_config()?;
    let store = open_store(&config.store).context("opening store")?;

    let mut observers: Vec<Arc<dyn LoadObserver>> = Vec::new();
    if !cli.quiet {
        observers.push(Arc::new(StdErrObserver));
    }
    if let Some(path) = &cli.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }

    let report = {
        let mut pipeline = Pipeline::new(store, config.pipeline_options())
            .with_observer(Arc::new(CompositeObserver::new(observers)));
        pipeline.run()?
    };

    if let Some(path) = &cli.report_json {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("writing report {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;
    use crate::config::StoreBackend;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "sheet-loader",
            "--source-dir",
            "/in",
            "--backend",
            "memory",
            "--batch-size",
            "10",
            "--delimiter",
            ";",
        ])
        .unwrap();
        let cfg = cli.load_config().unwrap();
        assert_eq!(cfg.source_dir.to_str(), Some("/in"));
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.batch_size, 10);
        assert_eq!(cfg.csv_delimiter, Some(';'));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let cli = Cli::try_parse_from(["sheet-loader", "--backend", "memory", "--batch-size", "0"])
            .unwrap();
        assert!(cli.load_config().is_err());
    }
}
