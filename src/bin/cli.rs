//! track-stitcher CLI - build import candidates from OpenStreetMap ways
//!
//! Usage:
//!   track-stitcher regions
//!   track-stitcher stitch <overpass.json> [--existing <names.txt>] [--output <file>]
//!   track-stitcher fetch <region> [--city <name>] [--existing <names.txt>] [--output <file>]
//!
//! `stitch` works offline on a saved Overpass response; `fetch` queries the
//! Overpass API (requires the `http` feature). Candidates are written as JSON.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use track_stitcher::{
    build_candidates, parse_overpass_response, regions, ExistingNames, ImportConfig,
    PipelineOutput,
};

#[derive(Parser)]
#[command(name = "track-stitcher")]
#[command(about = "Reconstruct unpaved roads from OpenStreetMap ways", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the regions that can be fetched
    Regions,

    /// Build candidates from a saved Overpass JSON response
    Stitch {
        /// Overpass `out geom;` JSON file
        input: PathBuf,

        /// File with one existing road name per line
        #[arg(short, long)]
        existing: Option<PathBuf>,

        /// Write candidates here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query the Overpass API for a region and build candidates
    Fetch {
        /// Region (prefecture) name
        region: String,

        /// Narrow the query to a municipality inside the region
        #[arg(long)]
        city: Option<String>,

        /// File with one existing road name per line
        #[arg(short, long)]
        existing: Option<PathBuf>,

        /// Write candidates here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Regions => {
            for name in regions::region_names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Stitch {
            input,
            existing,
            output,
        } => {
            let body = fs::read_to_string(&input)
                .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;
            let fragments = parse_overpass_response(&body).map_err(|e| e.to_string())?;
            let existing = load_existing(existing.as_deref())?;

            let result = build_candidates(fragments, &existing, &config);
            write_output(&result, output.as_deref())
        }
        Commands::Fetch {
            region,
            city,
            existing,
            output,
        } => fetch(&region, city.as_deref(), existing.as_deref(), output.as_deref(), &config),
    }
}

#[cfg(feature = "http")]
fn fetch(
    region: &str,
    city: Option<&str>,
    existing: Option<&Path>,
    output: Option<&Path>,
    config: &ImportConfig,
) -> Result<(), String> {
    use track_stitcher::{run_import, AreaQuery, BlockingOverpassSource, InMemoryRoadStore};

    let query = AreaQuery::for_region(region, city).map_err(|e| e.to_string())?;
    let source = BlockingOverpassSource::new(&config.upstream).map_err(|e| e.to_string())?;
    let store = InMemoryRoadStore::with_names(read_names(existing)?);

    let result = run_import(&source, &store, &query, config).map_err(|e| e.to_string())?;
    write_output(&result, output)
}

#[cfg(not(feature = "http"))]
fn fetch(
    _region: &str,
    _city: Option<&str>,
    _existing: Option<&Path>,
    _output: Option<&Path>,
    _config: &ImportConfig,
) -> Result<(), String> {
    Err("the fetch command requires the `http` feature".to_string())
}

fn load_config(path: Option<&Path>) -> Result<ImportConfig, String> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            ImportConfig::from_json(&json).map_err(|e| e.to_string())
        }
        None => Ok(ImportConfig::default()),
    }
}

/// One name per line; blank lines ignored.
fn read_names(path: Option<&Path>) -> Result<Vec<String>, String> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

fn load_existing(path: Option<&Path>) -> Result<ExistingNames, String> {
    Ok(ExistingNames::from_names(read_names(path)?))
}

fn write_output(result: &PipelineOutput, output: Option<&Path>) -> Result<(), String> {
    let stats = &result.stats;
    eprintln!(
        "{} candidates ({} need review) from {} fragments in {} groups",
        stats.candidates, stats.review_required, stats.fragments_received, stats.groups
    );

    let json = serde_json::to_string_pretty(&result.candidates).map_err(|e| e.to_string())?;
    match output {
        Some(path) => fs::write(path, json)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e)),
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            writeln!(out, "{}", json).map_err(|e| e.to_string())
        }
    }
}
