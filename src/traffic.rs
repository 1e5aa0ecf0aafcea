use std::collections::HashMap;

use crate::model::{Station, StationTraffic, Trip};

/// Joins trip counts onto stations by `short_name`.
///
/// Departures are counted by `start_station_id` and arrivals by
/// `end_station_id`. Every station gets a record, in input order, with zeros
/// where no trip matched. Trips naming unknown stations are counted but never
/// looked up.
pub fn compute_station_traffic<'a, I>(stations: &[Station], trips: I) -> Vec<StationTraffic>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let mut departures: HashMap<&str, usize> = HashMap::new();
    let mut arrivals: HashMap<&str, usize> = HashMap::new();

    for trip in trips {
        *departures.entry(trip.start_station_id.as_str()).or_default() += 1;
        *arrivals.entry(trip.end_station_id.as_str()).or_default() += 1;
    }

    stations
        .iter()
        .map(|station| {
            let key = station.short_name.as_str();
            StationTraffic::new(
                station.clone(),
                departures.get(key).copied().unwrap_or(0),
                arrivals.get(key).copied().unwrap_or(0),
            )
        })
        .collect()
}

/// Returns the station with the highest total traffic, first one on ties.
pub fn busiest(station_traffic: &[StationTraffic]) -> Option<&StationTraffic> {
    station_traffic
        .iter()
        .filter(|s| s.total_traffic() > 0)
        .reduce(|best, s| {
            if s.total_traffic() > best.total_traffic() {
                s
            } else {
                best
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    fn trip(from: &str, to: &str) -> Trip {
        Trip {
            start_station_id: from.to_string(),
            end_station_id: to.to_string(),
            started_at: parse_timestamp("2024-03-01 08:10:00").unwrap(),
            ended_at: parse_timestamp("2024-03-01 08:40:00").unwrap(),
        }
    }

    fn stations(names: &[&str]) -> Vec<Station> {
        names.iter().map(|n| Station::new(*n, -71.0, 42.0)).collect()
    }

    #[test]
    fn test_single_trip_left_join() {
        let result = compute_station_traffic(&stations(&["A", "B", "C"]), &[trip("A", "B")]);

        let counts: Vec<_> = result
            .iter()
            .map(|s| (s.short_name(), s.departures(), s.arrivals(), s.total_traffic()))
            .collect();
        assert_eq!(
            counts,
            vec![("A", 1, 0, 1), ("B", 0, 1, 1), ("C", 0, 0, 0)]
        );
    }

    #[test]
    fn test_round_trip_counts_both_ways() {
        let result = compute_station_traffic(&stations(&["A"]), &[trip("A", "A")]);
        assert_eq!(result[0].departures(), 1);
        assert_eq!(result[0].arrivals(), 1);
        assert_eq!(result[0].total_traffic(), 2);
    }

    #[test]
    fn test_preserves_station_order() {
        let trips = vec![trip("C", "A"), trip("B", "C"), trip("C", "B")];
        let result = compute_station_traffic(&stations(&["C", "A", "B"]), &trips);
        let order: Vec<_> = result.iter().map(|s| s.short_name()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(result[0].departures(), 2);
        assert_eq!(result[0].arrivals(), 1);
    }

    #[test]
    fn test_unknown_station_ids_are_ignored() {
        let result = compute_station_traffic(&stations(&["A"]), &[trip("X", "Y")]);
        assert_eq!(result[0].total_traffic(), 0);
    }

    #[test]
    fn test_empty_trips() {
        let result = compute_station_traffic(&stations(&["A", "B"]), &Vec::<Trip>::new());
        assert!(result.iter().all(|s| s.total_traffic() == 0));
        assert!(busiest(&result).is_none());
    }

    #[test]
    fn test_total_invariant_holds() {
        let trips = vec![trip("A", "B"), trip("B", "A"), trip("A", "C"), trip("C", "C")];
        for s in compute_station_traffic(&stations(&["A", "B", "C", "D"]), &trips) {
            assert_eq!(s.total_traffic(), s.departures() + s.arrivals());
        }
    }

    #[test]
    fn test_busiest_first_on_ties() {
        let trips = vec![trip("A", "B")];
        let result = compute_station_traffic(&stations(&["C", "A", "B"]), &trips);
        assert_eq!(busiest(&result).map(|s| s.short_name()), Some("A"));
    }
}
