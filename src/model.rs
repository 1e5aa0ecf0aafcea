//! Trip and station records, and the per-station traffic derived from them.

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Timestamp layouts seen in bike-share trip exports, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One bike rental, as read from a trips CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Trip {
    pub start_station_id: String,
    pub end_station_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started_at: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub ended_at: NaiveDateTime,
}

/// A dock location from the station information feed.
///
/// Anything besides the key and coordinates is carried through untouched so
/// the renderer still sees `name`, `capacity` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub short_name: String,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lon: f64,
    #[serde(deserialize_with = "deserialize_coordinate")]
    pub lat: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Station {
    pub fn new(short_name: impl Into<String>, lon: f64, lat: f64) -> Self {
        Self {
            short_name: short_name.into(),
            lon,
            lat,
            extra: serde_json::Map::new(),
        }
    }

    /// Returns the display name from the passthrough fields, if the feed has one.
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(|v| v.as_str())
    }
}

/// Keys written next to a station's own fields in traffic and marker output.
/// A passthrough field with one of these names is dropped so the emitted
/// object never carries the same key twice.
pub const DERIVED_KEYS: &[&str] = &[
    "departures",
    "arrivals",
    "totalTraffic",
    "radius",
    "flow",
    "title",
];

/// A station together with the trips that touched it under the active filter.
///
/// Only [`StationTraffic::new`] builds one, so `total_traffic` always equals
/// `departures + arrivals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationTraffic {
    #[serde(flatten)]
    station: Station,
    departures: usize,
    arrivals: usize,
    total_traffic: usize,
}

impl StationTraffic {
    pub fn new(mut station: Station, departures: usize, arrivals: usize) -> Self {
        for key in DERIVED_KEYS {
            if station.extra.remove(*key).is_some() {
                debug!(
                    station = %station.short_name,
                    key,
                    "Dropped passthrough field shadowed by traffic output"
                );
            }
        }
        Self {
            station,
            departures,
            arrivals,
            total_traffic: departures + arrivals,
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn short_name(&self) -> &str {
        &self.station.short_name
    }

    pub fn departures(&self) -> usize {
        self.departures
    }

    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    pub fn total_traffic(&self) -> usize {
        self.total_traffic
    }

    /// Share of this station's traffic that left from it. `None` for idle stations.
    pub fn departure_ratio(&self) -> Option<f64> {
        if self.total_traffic == 0 {
            None
        } else {
            Some(self.departures as f64 / self.total_traffic as f64)
        }
    }

    /// Buckets the departure ratio into `0.0`, `0.5` or `1.0`.
    ///
    /// The unit interval is cut into equal thirds: mostly arrivals, balanced,
    /// mostly departures. Renderers blend marker color on this value.
    pub fn flow_bucket(&self) -> Option<f64> {
        self.departure_ratio().map(quantize_flow)
    }

    /// Hover text for the station's marker.
    pub fn tooltip(&self) -> String {
        format!(
            "{} trips ({} departures, {} arrivals)",
            self.total_traffic, self.departures, self.arrivals
        )
    }
}

const FLOW_BUCKETS: [f64; 3] = [0.0, 0.5, 1.0];

fn quantize_flow(ratio: f64) -> f64 {
    let n = FLOW_BUCKETS.len();
    let idx = (ratio.clamp(0.0, 1.0) * n as f64).floor() as usize;
    FLOW_BUCKETS[idx.min(n - 1)]
}

/// Parses a trip timestamp into its wall-clock date and time.
///
/// RFC 3339 values keep the wall clock of their own offset; minute-of-day
/// filtering cares about what the dock clock read, not UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_local())
        .map_err(|_| anyhow!("unrecognized timestamp '{raw}'"))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

fn deserialize_coordinate<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(v) => Ok(v),
        Coordinate::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate '{s}'"))),
    }
}
