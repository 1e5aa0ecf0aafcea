//! Loaded data plus the traffic derived for the current time filter.

use std::sync::Arc;

use tracing::debug;

use crate::model::{Station, StationTraffic, Trip};
use crate::scale::{RadiusRange, SqrtScale, derive_radius_scale};
use crate::time_filter::{TimeFilter, filter_trips_by_time};
use crate::traffic::compute_station_traffic;

/// Everything a renderer reads for one filter position. Never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSnapshot {
    pub filter: TimeFilter,
    pub stations: Vec<StationTraffic>,
    pub radius: SqrtScale,
    pub matched_trips: usize,
}

impl TrafficSnapshot {
    fn compute(
        stations: &[Station],
        trips: &[Trip],
        filter: TimeFilter,
        range: RadiusRange,
    ) -> Self {
        let matched = filter_trips_by_time(trips, filter);
        let station_traffic = compute_station_traffic(stations, matched.iter().copied());
        let radius = derive_radius_scale(&station_traffic, range);

        Self {
            filter,
            matched_trips: matched.len(),
            stations: station_traffic,
            radius,
        }
    }

    pub fn max_traffic(&self) -> usize {
        self.stations
            .iter()
            .map(StationTraffic::total_traffic)
            .max()
            .unwrap_or(0)
    }

    /// Stations that saw at least one trip.
    pub fn active_stations(&self) -> usize {
        self.stations
            .iter()
            .filter(|s| s.total_traffic() > 0)
            .count()
    }
}

/// Owns trips and stations and the snapshot for the active filter.
///
/// [`TrafficMap::set_filter`] builds a fresh snapshot and swaps it in whole;
/// anyone still holding the previous `Arc` keeps a consistent view.
pub struct TrafficMap {
    trips: Vec<Trip>,
    stations: Vec<Station>,
    range: RadiusRange,
    current: Arc<TrafficSnapshot>,
}

impl TrafficMap {
    pub fn new(stations: Vec<Station>, trips: Vec<Trip>, range: RadiusRange) -> Self {
        let current = Arc::new(TrafficSnapshot::compute(
            &stations,
            &trips,
            TimeFilter::NoFilter,
            range,
        ));
        Self {
            trips,
            stations,
            range,
            current,
        }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn snapshot(&self) -> Arc<TrafficSnapshot> {
        Arc::clone(&self.current)
    }

    /// Recomputes traffic for `filter` and makes it current.
    pub fn set_filter(&mut self, filter: TimeFilter) -> Arc<TrafficSnapshot> {
        let next = TrafficSnapshot::compute(&self.stations, &self.trips, filter, self.range);
        debug!(
            filter = %filter,
            matched_trips = next.matched_trips,
            max_traffic = next.max_traffic(),
            "Traffic recomputed"
        );
        self.current = Arc::new(next);
        self.snapshot()
    }
}
