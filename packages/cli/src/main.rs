#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the dashboard aggregation tool.
//!
//! Loads the two source datasets once, applies the selection flags, and
//! writes the requested derived view as JSON for the rendering layer.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use delito_map_analytics::Datasets;
use delito_map_analytics_models::{ColorTheme, HeatmapView, Selection};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "delito_map", about = "Montevideo crime dashboard aggregation tool")]
struct Cli {
    /// Path to the crime records CSV
    #[arg(long, default_value = "data/delitos.csv")]
    crimes: PathBuf,

    /// Path to the neighborhood boundaries CSV (WKT geometry + ratio)
    #[arg(long, default_value = "data/geo_filtrado.csv")]
    neighborhoods: PathBuf,

    /// Write output JSON to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the weekday-by-hour heatmap matrix
    Heatmap {
        /// Restrict to incidents from this year
        #[arg(long)]
        year: Option<i32>,
        /// Restrict to this crime-type label
        #[arg(long)]
        crime_type: Option<String>,
        /// Color theme passed through to the renderer
        #[arg(long, default_value = "blues")]
        theme: ColorTheme,
    },
    /// Compute the choropleth feature collection (geometry + ratio)
    Choropleth {
        /// Restrict to incidents from this year
        #[arg(long)]
        year: Option<i32>,
        /// Restrict to this crime-type label
        #[arg(long)]
        crime_type: Option<String>,
    },
    /// Rank neighborhoods by ratio, most dangerous first
    Ranking,
    /// Compute all three views for one selection
    Dashboard {
        /// Restrict to incidents from this year
        #[arg(long)]
        year: Option<i32>,
        /// Restrict to this crime-type label
        #[arg(long)]
        crime_type: Option<String>,
        /// Color theme passed through to the renderer
        #[arg(long, default_value = "blues")]
        theme: ColorTheme,
    },
    /// List the years and crime types available in the datasets
    Info,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let records = delito_map_ingest::load_crime_records(&cli.crimes)?;
    let boundaries = delito_map_ingest::load_neighborhoods(&cli.neighborhoods)?;
    let datasets = Datasets::new(records, boundaries);
    log::info!(
        "Datasets loaded in {:.2}s ({} records, {} boundaries)",
        start.elapsed().as_secs_f64(),
        datasets.records().len(),
        datasets.boundaries().len()
    );

    let compute = Instant::now();
    match &cli.command {
        Commands::Heatmap {
            year,
            crime_type,
            theme,
        } => {
            let selection = selection(*year, crime_type.clone(), *theme);
            let filtered: Vec<_> =
                delito_map_analytics::filter_records(datasets.records(), &selection).collect();
            let matrix = delito_map_analytics::day_hour_matrix(filtered);
            write_output(cli.output.as_deref(), &HeatmapView::new(&matrix, *theme))?;
        }
        Commands::Choropleth { year, crime_type } => {
            let selection = selection(*year, crime_type.clone(), ColorTheme::default());
            let filtered: Vec<_> =
                delito_map_analytics::filter_records(datasets.records(), &selection).collect();
            let collection =
                delito_map_analytics::choropleth_view(filtered, datasets.boundaries())?;
            write_output(cli.output.as_deref(), &collection)?;
        }
        Commands::Ranking => {
            let ranking = delito_map_analytics::rank_neighborhoods(datasets.boundaries());
            write_output(cli.output.as_deref(), &ranking)?;
        }
        Commands::Dashboard {
            year,
            crime_type,
            theme,
        } => {
            let views = datasets.dashboard(&selection(*year, crime_type.clone(), *theme))?;
            write_output(cli.output.as_deref(), &views)?;
        }
        Commands::Info => {
            println!("YEARS");
            for year in datasets.years() {
                println!("  {year}");
            }
            println!("CRIME TYPES");
            for crime_type in datasets.crime_types() {
                println!("  {crime_type}");
            }
        }
    }
    log::info!("Views computed in {:.2}s", compute.elapsed().as_secs_f64());

    Ok(())
}

const fn selection(year: Option<i32>, crime_type: Option<String>, theme: ColorTheme) -> Selection {
    Selection {
        year,
        crime_type,
        theme,
    }
}

/// Writes a view as pretty-printed JSON to the output file, or stdout if
/// none was given.
fn write_output<T: Serialize>(
    path: Option<&std::path::Path>,
    view: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            serde_json::to_writer_pretty(file, view)?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            serde_json::to_writer_pretty(std::io::stdout().lock(), view)?;
            println!();
        }
    }
    Ok(())
}
