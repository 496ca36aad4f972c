//! CLI entry point for the bikeshare explorer.
//!
//! Provides an interactive exploration loop plus one-shot report, preview
//! and listing subcommands over per-city trip CSV files.

mod prompt;

use crate::prompt::MenuChoice;
use anyhow::{Context, Result};
use bikeshare::analyzers::engine::{Operation, StatsSession};
use bikeshare::config::Settings;
use bikeshare::dataset::{DatasetLoader, FilterCriteria};
use bikeshare::lookup;
use bikeshare::output::{
    SEPARATOR, cities_listing, days_listing, int_formatter, months_listing, render_preview,
    render_station_stats, render_time_stats, render_trip_duration_stats, render_user_stats,
    report_json,
};
use bikeshare::stats::CityReport;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare")]
#[command(about = "Explore US bikeshare trip data", long_about = None)]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing the city CSV files
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct FilterArgs {
    /// City code (CH, NY, WA)
    #[arg(short, long)]
    city: String,

    /// Month index, 0 = all
    #[arg(short, long, default_value_t = 0)]
    month: usize,

    /// Day of week index (1 = Sunday), 0 = all
    #[arg(short, long, default_value_t = 0)]
    day: usize,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        let city = lookup::city_name(&self.city)?;
        let month = lookup::month_name(self.month)?;
        let day = lookup::day_name(self.day)?;
        Ok(FilterCriteria::new(city).with_month(month).with_weekday(day))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively choose filters and view statistics (default)
    Explore,
    /// Print statistics for one filter selection
    Report {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print a slice of the filtered rows
    Preview {
        #[command(flatten)]
        filters: FilterArgs,

        /// First row to show
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Number of rows (defaults to the configured slice size)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List city codes, months and days of week
    Cities,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/bikeshare.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref(), cli.data_dir)?;
    debug!(?settings, "Settings resolved");

    let loader = DatasetLoader::new(&settings.data_dir);

    match cli.command.unwrap_or(Commands::Explore) {
        Commands::Explore => {
            explore(&mut io::stdout(), &loader, &settings)?;
        }
        Commands::Report { filters, json } => {
            let criteria = filters.criteria()?;
            let mut session = StatsSession::new(load(&loader, &criteria)?);
            let mut out = io::stdout().lock();

            if json {
                let report = build_report(&mut session, &criteria)?;
                writeln!(out, "{}", report_json(&report)?)?;
            } else {
                print_stats(&mut out, &mut session)?;
            }
        }
        Commands::Preview {
            filters,
            offset,
            limit,
        } => {
            let criteria = filters.criteria()?;
            let dataset = load(&loader, &criteria)?;
            let preview = dataset.rows_from(offset, limit.unwrap_or(settings.slice_size));
            write!(io::stdout().lock(), "{}", render_preview(&preview))?;
        }
        Commands::Cities => {
            let mut out = io::stdout().lock();
            writeln!(out, "Cities: {}", cities_listing())?;
            writeln!(out, "Months: {}", months_listing())?;
            writeln!(out, "Days: {}", days_listing())?;
        }
    }

    Ok(())
}

/// Loads a dataset, attaching the selection to any error.
#[tracing::instrument(skip_all, fields(city = %criteria.city, month = %criteria.month, weekday = %criteria.weekday))]
fn load(
    loader: &DatasetLoader,
    criteria: &FilterCriteria,
) -> Result<bikeshare::dataset::Dataset> {
    let dataset = loader
        .load(criteria)
        .with_context(|| format!("Failed to load data for {}", criteria.city))?;
    info!(rows = dataset.row_count(), "Dataset loaded");
    Ok(dataset)
}

/// The interactive loop: filters, report, then the follow-up menu.
///
/// Filter problems lead back to the prompts; a malformed dataset ends the run.
fn explore<W: Write>(out: &mut W, loader: &DatasetLoader, settings: &Settings) -> Result<()> {
    writeln!(out, "Hello! Let's explore some US bikeshare data!")?;

    loop {
        let Some(criteria) = prompt::get_filters()? else {
            return Ok(());
        };
        writeln!(out, "{SEPARATOR}")?;

        let session = match loader.load(&criteria) {
            Ok(dataset) => {
                info!(
                    city = %criteria.city,
                    month = %criteria.month,
                    weekday = %criteria.weekday,
                    rows = dataset.row_count(),
                    "Dataset loaded"
                );
                let mut session = StatsSession::new(dataset);
                print_stats(out, &mut session)?;
                Some(session)
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, city = %criteria.city, "Filter selection rejected");
                writeln!(out, "\nThere is no data for your filter combination, try another one")?;
                writeln!(out, "({e})")?;
                writeln!(out, "{SEPARATOR}")?;
                None
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Dataset for {} is malformed", criteria.city));
            }
        };

        let mut next_start = Some(0);
        loop {
            match prompt::menu(settings.first_records)? {
                MenuChoice::Exit => return Ok(()),
                MenuChoice::Restart => break,
                MenuChoice::FirstRecords | MenuChoice::NextPage if session.is_none() => {
                    writeln!(out, "\nNo data loaded")?;
                }
                MenuChoice::FirstRecords => {
                    if let Some(session) = session.as_ref() {
                        let preview = session.dataset().take_first(settings.first_records);
                        write!(out, "{}", render_preview(&preview))?;
                    }
                }
                MenuChoice::NextPage => match (session.as_ref(), next_start) {
                    (Some(session), Some(start)) => {
                        let (preview, next) =
                            session.dataset().raw_data(start, settings.slice_size);
                        write!(out, "{}", render_preview(&preview))?;
                        next_start = next;
                    }
                    _ => writeln!(out, "\nNo more rows")?,
                },
            }
        }
    }
}

/// Computes and writes all four statistics sections with their timings.
fn print_stats<W: Write>(out: &mut W, session: &mut StatsSession) -> Result<()> {
    let mut text = format!(
        "\nTrips matching filters: {}\n",
        int_formatter(session.row_count())
    );

    let time = session.time_stats()?;
    render_time_stats(&mut text, &time, session.operation_time(Operation::Time))?;

    let station = session.station_stats()?;
    render_station_stats(&mut text, &station, session.operation_time(Operation::Station))?;

    let duration = session.trip_duration_stats()?;
    render_trip_duration_stats(
        &mut text,
        &duration,
        session.operation_time(Operation::TripDuration),
    )?;

    let user = session.user_stats()?;
    render_user_stats(&mut text, &user, session.operation_time(Operation::User))?;

    out.write_all(text.as_bytes())?;

    for (op, elapsed) in session.operation_times() {
        debug!(operation = %op, elapsed_secs = elapsed.as_secs_f64(), "Statistics timing");
    }
    Ok(())
}

fn build_report(session: &mut StatsSession, criteria: &FilterCriteria) -> Result<CityReport> {
    let time = session.time_stats()?;
    let station = session.station_stats()?;
    let trip_duration = session.trip_duration_stats()?;
    let user = session.user_stats()?;

    let operation_seconds = session
        .operation_times()
        .iter()
        .map(|(op, elapsed)| (op.to_string(), elapsed.as_secs_f64()))
        .collect();

    Ok(CityReport {
        city: criteria.city.clone(),
        month: criteria.month.clone(),
        day_of_week: criteria.weekday.clone(),
        trips: session.row_count(),
        time,
        station,
        trip_duration,
        user,
        operation_seconds,
    })
}
