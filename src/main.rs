//! CLI entry point for the bike-share station traffic tool.
//!
//! Loads trip records and station metadata, then either writes a marker
//! report for one time-of-day filter or sweeps the filter across the day.

use anyhow::{Result, ensure};
use bikeshare_traffic::{
    config::Sources,
    fetch::BasicClient,
    loader::{load_stations, load_trips},
    model::{Station, Trip},
    output::{SweepRow, TrafficReport, append_record, print_pretty, write_report},
    scale::{DEFAULT_RADIUS_RANGE, RadiusRange},
    state::TrafficMap,
    time_filter::{MINUTES_PER_DAY, TimeFilter},
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_traffic")]
#[command(about = "Per-station bike-share traffic for map overlays", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Trips CSV path or URL (overrides BIKESHARE_TRIPS_SOURCE)
    #[arg(long, value_name = "FILE_OR_URL")]
    trips: Option<String>,

    /// Station information JSON path or URL (overrides BIKESHARE_STATIONS_SOURCE)
    #[arg(long, value_name = "FILE_OR_URL")]
    stations: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute station traffic for one time filter and write a JSON report
    Traffic {
        #[command(flatten)]
        sources: SourceArgs,

        /// Time of day: "any", -1, minutes since midnight, or HH:MM
        #[arg(short, long, default_value = "any")]
        time: TimeFilter,

        /// JSON file to write, "-" for stdout
        #[arg(short, long, default_value = "-")]
        output: String,

        /// Marker radius for zero traffic
        #[arg(long, default_value_t = DEFAULT_RADIUS_RANGE.min)]
        min_radius: f64,

        /// Marker radius for the busiest station
        #[arg(long, default_value_t = DEFAULT_RADIUS_RANGE.max)]
        max_radius: f64,
    },
    /// Step the time filter across the day and append a CSV row per step
    Sweep {
        #[command(flatten)]
        sources: SourceArgs,

        /// Minutes between filter positions
        #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..=1440))]
        step: u16,

        /// CSV file to append results to
        #[arg(short, long, default_value = "sweep.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bikeshare_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_traffic.log"));

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

    match cli.command {
        Commands::Traffic {
            sources,
            time,
            output,
            min_radius,
            max_radius,
        } => {
            ensure!(
                min_radius <= max_radius,
                "--min-radius ({min_radius}) must not exceed --max-radius ({max_radius})"
            );
            let (stations, trips) = load(sources).await?;
            let mut map = TrafficMap::new(stations, trips, RadiusRange::new(min_radius, max_radius));

            let snapshot = map.set_filter(time);
            print_pretty(&snapshot);
            info!(
                filter = %time,
                matched_trips = snapshot.matched_trips,
                active_stations = snapshot.active_stations(),
                max_traffic = snapshot.max_traffic(),
                "Traffic computed"
            );

            write_report(&output, &TrafficReport::from_snapshot(&snapshot))?;
        }
        Commands::Sweep {
            sources,
            step,
            output,
        } => {
            let (stations, trips) = load(sources).await?;
            let mut map = TrafficMap::new(stations, trips, DEFAULT_RADIUS_RANGE);
            sweep(&mut map, step, &output)?;
        }
    }

    Ok(())
}

/// Resolves sources and loads both datasets concurrently.
async fn load(args: SourceArgs) -> Result<(Vec<Station>, Vec<Trip>)> {
    let sources = Sources::from_env().with_overrides(args.trips, args.stations);
    info!(trips = %sources.trips, stations = %sources.stations, "Loading datasets");

    let client = BasicClient::new()?;
    let (stations, trips) = tokio::try_join!(
        load_stations(&client, &sources.stations),
        load_trips(&client, &sources.trips),
    )?;

    if stations.is_empty() {
        warn!("Station list is empty, every report will be empty");
    }

    Ok((stations, trips))
}

/// Records the unfiltered view, then one row per `step` minutes from midnight.
#[tracing::instrument(skip(map))]
fn sweep(map: &mut TrafficMap, step: u16, output: &str) -> Result<()> {
    let filters = std::iter::once(Ok(TimeFilter::NoFilter)).chain(
        (0..MINUTES_PER_DAY)
            .step_by(step as usize)
            .map(TimeFilter::at_minute),
    );

    let mut rows = 0;
    let mut peak: Option<(TimeFilter, usize)> = None;

    for filter in filters {
        let filter = filter?;
        let snapshot = map.set_filter(filter);
        let row = SweepRow::from_snapshot(&snapshot);
        debug!(
            filter = %filter,
            matched_trips = row.matched_trips,
            busiest = row.busiest_station.as_deref().unwrap_or("-"),
            "Sweep step"
        );

        if filter != TimeFilter::NoFilter
            && peak.is_none_or(|(_, trips)| snapshot.matched_trips > trips)
        {
            peak = Some((filter, snapshot.matched_trips));
        }

        append_record(output, &row)?;
        rows += 1;
    }

    if let Some((filter, trips)) = peak {
        info!(peak = %filter, trips, "Busiest time of day");
    }
    info!(rows, output, "Sweep complete");
    Ok(())
}
