//! campus-etl: load the registrar sources into a DuckDB store and print the
//! senior and section listings.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use campus_etl::cli::output;
use campus_etl::config::PipelineConfig;
use campus_etl::pipeline::{Pipeline, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "campus-etl", version, about = "Load campus registrar sources into DuckDB")]
struct Args {
    /// Store file to (re)build [default: luther.duckdb]
    db_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory for relative source paths
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(db_file) = &args.db_file {
        config = config.with_database(db_file);
    }
    if let Some(data_dir) = &args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let mut pipeline = Pipeline::new(config)?;
    let report = pipeline.run();
    eprint!("{}", output::format_run_summary(&report));

    let listings_ok = match pipeline.listings() {
        Ok(listings) => {
            print!("{}", output::format_listings(&listings));
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Cannot build listings");
            eprintln!("Error: {}", e.user_message());
            false
        }
    };

    if report.has_failures() || !listings_ok {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
