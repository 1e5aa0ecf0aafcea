//! Parsers for the trips CSV and the station information JSON.

use std::io::Read;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use serde::Deserialize;
use tracing::{debug, info};

use crate::fetch::{HttpClient, load_source};
use crate::model::{Station, Trip};

#[derive(Deserialize)]
struct StationFeed {
    data: StationData,
}

#[derive(Deserialize)]
struct StationData {
    stations: Vec<Station>,
}

/// Decodes trip records from CSV with a header row.
///
/// Columns beyond the four the aggregation needs are ignored.
///
/// # Errors
///
/// Returns an error naming the record if a row is malformed or carries an
/// unparseable timestamp.
pub fn parse_trips(bytes: &[u8]) -> Result<Vec<Trip>> {
    let mut rdr = csv::Reader::from_reader(bytes);
    let mut trips = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let trip: Trip = result.with_context(|| format!("bad trip record #{}", i + 1))?;
        trips.push(trip);
    }

    Ok(trips)
}

/// Decodes the `data.stations` array of a station information document.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let feed: StationFeed =
        serde_json::from_slice(bytes).context("station JSON lacks a data.stations array")?;
    Ok(feed.data.stations)
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Gunzips `bytes` when they start with the gzip magic number, otherwise
/// returns them as-is. `source` only labels errors.
pub fn decompress(source: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut out)
        .with_context(|| format!("failed to gunzip {source}"))?;
    debug!(compressed = bytes.len(), decompressed = out.len(), "Gunzipped source");
    Ok(out)
}

#[tracing::instrument(skip(client))]
pub async fn load_trips<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Trip>> {
    let bytes = decompress(source, load_source(client, source).await?)?;
    let trips = parse_trips(&bytes)?;
    info!(trips = trips.len(), "Trips loaded");
    Ok(trips)
}

#[tracing::instrument(skip(client))]
pub async fn load_stations<C: HttpClient>(client: &C, source: &str) -> Result<Vec<Station>> {
    let bytes = decompress(source, load_source(client, source).await?)?;
    let stations = parse_stations(&bytes)?;
    info!(stations = stations.len(), "Stations loaded");
    Ok(stations)
}
