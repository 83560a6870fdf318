use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hydro_series::analysis::{
    annual_volume, classify_years, concurrent_runs, concurrent_years, fill_single_gaps,
    locate_gap_rows, locate_gaps, quartiles, summary, to_hydrological_year, FillOutcome,
    GapFiller, VolumeThresholds,
};
use hydro_series::config::Config;
use hydro_series::utils::parse_column_index;
use hydro_series::workbook::{
    parse_sheet_index, save_workbook, SheetLayout, WorkbookDestination, WorkbookReader,
};
use hydro_series::DataMatrix;

#[derive(Parser)]
#[command(name = "hydro-series")]
#[command(about = "Gap filling and year statistics for hydrological station series", long_about = None)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SheetArgs {
    /// Workbook holding the station series
    #[arg(long)]
    file: PathBuf,

    /// Zero-based sheet index
    #[arg(long, default_value = "0")]
    sheet: String,
}

impl SheetArgs {
    fn load(&self) -> Result<DataMatrix, Box<dyn std::error::Error>> {
        let index = parse_sheet_index(&self.sheet)?;
        Ok(WorkbookReader::new(&self.file).load_matrix(index)?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// List missing cells
    Gaps {
        #[command(flatten)]
        source: SheetArgs,

        /// Only the first gap of each year
        #[arg(long)]
        rows: bool,
    },

    /// Fill missing cells by interpolation
    Fill {
        #[command(flatten)]
        source: SheetArgs,

        /// Companion station workbook used to correct long interpolations
        #[arg(long)]
        companion: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        companion_sheet: String,

        /// Only fill isolated single-cell gaps
        #[arg(long)]
        single: bool,

        /// Write the filled series to this workbook
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Years with complete data in both series
    Concurrent {
        #[command(flatten)]
        source: SheetArgs,

        /// Second series (defaults to the first one)
        #[arg(long)]
        other: Option<PathBuf>,

        #[arg(long, default_value = "0")]
        other_sheet: String,

        /// Group the years into consecutive runs
        #[arg(long)]
        runs: bool,
    },

    /// Split years into dry, normal and wet
    Classify {
        #[command(flatten)]
        source: SheetArgs,

        /// The sheet holds monthly flows rather than annual volumes
        #[arg(long)]
        flows: bool,
    },

    /// Realign monthly flows to hydrological years
    HydroYear {
        #[command(flatten)]
        source: SheetArgs,

        /// First month of the hydrological year (defaults to HYDRO_DRIEST_MONTH)
        #[arg(long)]
        driest_month: Option<u32>,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Max, mean, min and quartiles of a series
    Summary {
        #[command(flatten)]
        source: SheetArgs,

        /// Zero-based value column (default: every column)
        #[arg(long)]
        column: Option<String>,
    },
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    max: f64,
    mean: f64,
    min: f64,
    first_quartile: f64,
    third_quartile: f64,
}

fn emit<T: Serialize + std::fmt::Debug>(
    json: bool,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value:#?}");
    }
    Ok(())
}

fn write_output(
    matrix: &DataMatrix,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        save_workbook(SheetLayout::Matrix(matrix), &WorkbookDestination::new(path))?;
    }
    Ok(())
}

#[instrument(skip(cli, config))]
fn run(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Gaps { source, rows } => {
            let matrix = source.load()?;
            let gaps = if rows {
                locate_gap_rows(&matrix)
            } else {
                locate_gaps(&matrix)
            };
            info!("Found {} gaps", gaps.len());
            if cli.json {
                emit(true, &gaps)?;
            } else {
                for gap in &gaps {
                    println!("{}\t{}", gap.year, matrix.column_labels()[gap.column]);
                }
            }
        }
        Command::Fill {
            source,
            companion,
            companion_sheet,
            single,
            output,
        } => {
            let matrix = source.load()?;
            let companion = match companion {
                Some(path) => Some(
                    WorkbookReader::new(path).load_matrix(parse_sheet_index(&companion_sheet)?)?,
                ),
                None => None,
            };

            let outcome: FillOutcome = if single {
                fill_single_gaps(&matrix, None)?
            } else {
                let mut filler = GapFiller::new(&matrix).long_gap_run(config.long_gap_run);
                if let Some(companion) = &companion {
                    filler = filler.companion(companion);
                }
                filler.fill()?
            };

            write_output(&outcome.matrix, output)?;
            if cli.json {
                emit(true, &outcome)?;
            } else {
                println!("Filled {} gaps", outcome.filled.len());
                for diagnostic in &outcome.diagnostics {
                    println!("{diagnostic:?}");
                }
            }
        }
        Command::Concurrent {
            source,
            other,
            other_sheet,
            runs,
        } => {
            let a = source.load()?;
            let b = match other {
                Some(path) => {
                    WorkbookReader::new(path).load_matrix(parse_sheet_index(&other_sheet)?)?
                }
                None => a.clone(),
            };
            if runs {
                emit(cli.json, &concurrent_runs(&a, &b))?;
            } else {
                emit(cli.json, &concurrent_years(&a, &b))?;
            }
        }
        Command::Classify { source, flows } => {
            let matrix = source.load()?;
            let volumes = if flows {
                annual_volume(&matrix, None)?
            } else {
                matrix
            };
            let thresholds = VolumeThresholds::from_percentiles(
                &volumes,
                config.dry_percentile,
                config.wet_percentile,
            )?;
            let buckets = classify_years(&volumes, Some(thresholds))?;
            emit(cli.json, &buckets)?;
        }
        Command::HydroYear {
            source,
            driest_month,
            output,
        } => {
            let matrix = source.load()?;
            let realigned =
                to_hydrological_year(&matrix, driest_month.unwrap_or(config.driest_month))?;
            write_output(&realigned, output)?;
            emit(cli.json, &realigned)?;
        }
        Command::Summary { source, column } => {
            let matrix = source.load()?;
            let column = column.as_deref().map(parse_column_index).transpose()?;
            let stats = summary(&matrix, column)?;
            let (first_quartile, third_quartile) = quartiles(&matrix, column)?;
            emit(
                cli.json,
                &SummaryReport {
                    max: stats.max,
                    mean: stats.mean,
                    min: stats.min,
                    first_quartile,
                    third_quartile,
                },
            )?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hydro_series=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!("Starting hydro-series with config: {:?}", config);

    run(Cli::parse(), &config)
}
