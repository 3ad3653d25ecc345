//! Command line entry point
//!
//! Runs the full build against a flat-file genome database and writes
//! the merged tables. Exits non-zero on any fatal failure; nothing is
//! written when the build fails.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orthosim::aggregate::PipelineConfig;
use orthosim::annotations::SpeciesCode;
use orthosim::db::FlatFileDb;
use orthosim::driver::build;
use orthosim::ic::InformationContent;
use orthosim::output::{write_binary_file, write_tsv, write_tsv_file};
use orthosim::{OrthoResult, DEFAULT_INF_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD};

/// Rank candidate model organism species by GO functional similarity
/// of their orthologs
#[derive(Parser)]
#[command(name = "orthosim", version)]
struct Cli {
    /// Directory holding the flat-file genome database
    db: PathBuf,

    /// Candidate model species codes, e.g. MOUSE YEAST DROME
    #[arg(required = true)]
    models: Vec<String>,

    /// Information content table (tab-separated, optionally gzipped)
    #[arg(long)]
    ic: PathBuf,

    /// Query species code
    #[arg(long, default_value = "HUMAN")]
    query: String,

    /// Write the combined table as tab-separated text to this path
    #[arg(long)]
    tsv: Option<PathBuf>,

    /// Write the binary result tables to this path
    #[arg(long)]
    bin: Option<PathBuf>,

    /// Minimum ortholog pair similarity
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    similarity_threshold: f64,

    /// Minimum information content of a contributing GO term
    #[arg(long, default_value_t = DEFAULT_INF_THRESHOLD)]
    inf_threshold: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        process::exit(1);
    }
}

fn run(cli: &Cli) -> OrthoResult<()> {
    let ic = InformationContent::from_file(&cli.ic)?;
    info!(terms = ic.len(), "loaded information content table");

    let db = FlatFileDb::open(&cli.db)?;
    let query = SpeciesCode::try_from(cli.query.as_str())?;
    let models = cli
        .models
        .iter()
        .map(|code| SpeciesCode::try_from(code.as_str()))
        .collect::<OrthoResult<Vec<_>>>()?;

    let config = PipelineConfig {
        similarity_threshold: cli.similarity_threshold,
        inf_threshold: cli.inf_threshold,
        ..PipelineConfig::default()
    };

    let (summary, detail) = build(&db, &ic, &config, query, &models)?;
    info!(
        summary = summary.len(),
        detail = detail.len(),
        "build complete"
    );

    if let Some(path) = &cli.tsv {
        write_tsv_file(path, &summary, &detail)?;
    }
    if let Some(path) = &cli.bin {
        write_binary_file(path, &summary, &detail, &ic)?;
    }
    if cli.tsv.is_none() && cli.bin.is_none() {
        write_tsv(io::stdout().lock(), &summary, &detail)?;
    }
    Ok(())
}
