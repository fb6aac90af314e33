//! hdrscan CLI
//!
//! Prints every user header pulled in by the translation units of a
//! compilation database, one path per line.

use anyhow::{Context, Result};
use clap::Parser;
use hdrscan_core::{Config, DanglingOutputFlag, LogConfig, ScanConfig};
use hdrscan_parser::{CompilationDatabase, HeaderScanner};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, Dispatch};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hdrscan")]
#[command(author, version, about = "List the headers included by every entry of a compilation database", long_about = None)]
struct Cli {
    /// Compilation database (compile_commands.json)
    #[arg(value_name = "COMPILE_COMMANDS")]
    compdb: PathBuf,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Flag whose value names the compiler output
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
    output_flag: Option<String>,

    /// Flag selecting preprocess-only mode
    #[arg(long, value_name = "FLAG", allow_hyphen_values = true)]
    preprocess_flag: Option<String>,

    /// Path fragment marking system headers (repeatable, replaces the defaults)
    #[arg(long = "system-root", value_name = "PREFIX")]
    system_roots: Vec<String>,

    /// Run this compiler instead of the one in each entry
    #[arg(long, value_name = "PATH")]
    compiler: Option<PathBuf>,

    /// Skip assembly sources
    #[arg(long)]
    skip_asm: bool,

    /// Fail on an output flag with no value instead of dropping it
    #[arg(long)]
    reject_dangling_output: bool,

    /// Log filter, e.g. `debug` (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write diagnostics to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Print a summary to stderr when done
    #[arg(long)]
    stats: bool,
}

impl Cli {
    /// Configuration file values with command-line overrides applied
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let scan = &mut config.scan;
        if let Some(flag) = &self.output_flag {
            scan.output_flag = flag.clone();
        }
        if let Some(flag) = &self.preprocess_flag {
            scan.preprocess_flag = flag.clone();
        }
        if !self.system_roots.is_empty() {
            scan.system_roots = self.system_roots.clone();
        }
        if let Some(compiler) = &self.compiler {
            scan.compiler = Some(compiler.clone());
        }
        if self.skip_asm {
            scan.skip_assembly = true;
        }
        if self.reject_dangling_output {
            scan.dangling_output = DanglingOutputFlag::Reject;
        }

        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.log.file = Some(file.clone());
        }

        Ok(config)
    }
}

/// Build the diagnostics subscriber for this run
fn build_dispatch(log: &LogConfig) -> Result<Dispatch> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&log.level)
            .with_context(|| format!("invalid log level `{}`", log.level))?,
    };

    let (writer, ansi) = match &log.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish();

    Ok(Dispatch::new(subscriber))
}

/// Scan the database named on the command line, writing headers to `out`
fn run<W: Write>(cli: &Cli, scan: ScanConfig, out: &mut W) -> Result<()> {
    let db = CompilationDatabase::from_file(&cli.compdb)
        .with_context(|| format!("cannot load {}", cli.compdb.display()))?;
    info!("{} has {} entries", cli.compdb.display(), db.len());

    let stats = HeaderScanner::new(scan).scan(&db, out)?;

    if cli.stats {
        eprintln!("Entries:         {}", stats.entries);
        eprintln!("Skipped:         {}", stats.skipped);
        eprintln!("Headers:         {}", stats.headers);
        eprintln!("Malformed lines: {}", stats.malformed_lines);
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let setup = cli
        .load_config()
        .and_then(|config| Ok((build_dispatch(&config.log)?, config.scan)));
    let (dispatch, scan) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("hdrscan: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::dispatcher::with_default(&dispatch, || {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        match run(&cli, scan, &mut out) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        }
    })
}
