use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use irmaparq_core::{ingest_file, ingest_run_directory, RunConfig};

#[derive(Parser)]
#[command(name = "irmaparq")]
#[command(about = "Normalize influenza assembly run artifacts into Parquet")]
#[command(version)]
struct Cli {
    /// Working directory root holding the assembly run
    #[arg(short = 'p', long = "path", default_value = ".")]
    path: PathBuf,

    /// Single input file; omit to ingest the run directory under <PATH>/IRMA
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Output artifact for single-file mode; defaults to the input path
    /// with a parq extension
    #[arg(short = 'o', long = "outputname")]
    outputname: Option<PathBuf>,

    /// Run identifier stamped on every row; defaults to the current
    /// directory's name
    #[arg(short = 'r', long = "runid")]
    runid: Option<String>,

    /// Instrument name stamped on every row
    #[arg(short = 'i', long = "instrument", default_value = "testInstrument")]
    instrument: String,

    /// Keep every variant column instead of the standard projection
    #[arg(long = "full-alleles")]
    full_alleles: bool,
}

/// Console logging, filterable through RUST_LOG.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("irmaparq=info,irmaparq_core=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let run_id = match cli.runid {
        Some(id) => id,
        None => current_dir_name()?,
    };
    let config = RunConfig {
        root: cli.path,
        input: cli.file,
        output: cli.outputname,
        run_id,
        instrument: cli.instrument,
        full_alleles: cli.full_alleles,
    };

    match config.input.clone() {
        Some(input) => {
            let written = ingest_file(&config, &input)
                .with_context(|| format!("ingesting {}", input.display()))?;
            info!(path = %written.display(), "ingest complete");
        }
        None => {
            let written = ingest_run_directory(&config).with_context(|| {
                format!("ingesting run directory under {}", config.root.display())
            })?;
            info!(artifacts = written.len(), "ingest complete");
        }
    }
    Ok(())
}

fn current_dir_name() -> anyhow::Result<String> {
    let cwd = std::env::current_dir().context("resolving current directory")?;
    Ok(cwd
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string())
}
