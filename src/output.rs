//! Output formatting and persistence for station traffic.
//!
//! Supports a JSON marker report for renderers and CSV append for sweeps.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::model::StationTraffic;
use crate::scale::RadiusRange;
use crate::state::TrafficSnapshot;
use crate::traffic::busiest;

/// One circle marker: the station's traffic plus how to draw it.
///
/// Station passthrough fields named like the marker's own keys are dropped
/// when the [`StationTraffic`] is built.
#[derive(Debug, Serialize)]
pub struct StationMarker {
    #[serde(flatten)]
    pub traffic: StationTraffic,
    pub radius: f64,
    /// Departure-ratio bucket; `None` for stations without traffic.
    pub flow: Option<f64>,
    pub title: String,
}

/// Renderer-facing report for a single time filter.
#[derive(Debug, Serialize)]
pub struct TrafficReport {
    pub generated_at: DateTime<Utc>,
    pub filter: String,
    pub minutes: Option<u16>,
    pub matched_trips: usize,
    pub max_traffic: usize,
    pub radius_range: RadiusRange,
    pub stations: Vec<StationMarker>,
}

impl TrafficReport {
    pub fn from_snapshot(snapshot: &TrafficSnapshot) -> Self {
        let stations = snapshot
            .stations
            .iter()
            .map(|s| StationMarker {
                radius: snapshot.radius.scale(s.total_traffic() as f64),
                flow: s.flow_bucket(),
                title: s.tooltip(),
                traffic: s.clone(),
            })
            .collect();

        TrafficReport {
            generated_at: Utc::now(),
            filter: snapshot.filter.to_string(),
            minutes: snapshot.filter.minutes(),
            matched_trips: snapshot.matched_trips,
            max_traffic: snapshot.max_traffic(),
            radius_range: snapshot.radius.range(),
            stations,
        }
    }
}

/// One step of a sweep across the day.
#[derive(Debug, Default, Serialize)]
pub struct SweepRow {
    pub filter: String,
    pub minutes: Option<u16>,
    pub matched_trips: usize,
    pub active_stations: usize,
    pub max_traffic: usize,
    pub busiest_station: Option<String>,
}

impl SweepRow {
    pub fn from_snapshot(snapshot: &TrafficSnapshot) -> Self {
        SweepRow {
            filter: snapshot.filter.to_string(),
            minutes: snapshot.filter.minutes(),
            matched_trips: snapshot.matched_trips,
            active_stations: snapshot.active_stations(),
            max_traffic: snapshot.max_traffic(),
            busiest_station: busiest(&snapshot.stations).map(|s| s.short_name().to_string()),
        }
    }
}

/// Logs a snapshot using Rust's debug pretty-print format.
pub fn print_pretty(snapshot: &TrafficSnapshot) {
    debug!("{:#?}", snapshot);
}

/// Writes the report as pretty JSON to `path`, or to stdout when `path` is `-`.
pub fn write_report(path: &str, report: &TrafficReport) -> Result<()> {
    if path == "-" {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, report)?;
    out.flush()?;

    info!(path, stations = report.stations.len(), "Report written");
    Ok(())
}

/// Appends a [`SweepRow`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, row: &SweepRow) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // header only on a fresh file
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}
