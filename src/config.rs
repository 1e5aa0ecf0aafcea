//! Where the two datasets come from.

pub const DEFAULT_TRIPS_SOURCE: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";
pub const DEFAULT_STATIONS_SOURCE: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";

pub const TRIPS_ENV: &str = "BIKESHARE_TRIPS_SOURCE";
pub const STATIONS_ENV: &str = "BIKESHARE_STATIONS_SOURCE";

/// Trip and station sources, each a local path or an `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub trips: String,
    pub stations: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            trips: DEFAULT_TRIPS_SOURCE.to_string(),
            stations: DEFAULT_STATIONS_SOURCE.to_string(),
        }
    }
}

impl Sources {
    /// Reads sources from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            trips: lookup(TRIPS_ENV).unwrap_or(defaults.trips),
            stations: lookup(STATIONS_ENV).unwrap_or(defaults.stations),
        }
    }

    /// Applies command-line overrides on top of the current values.
    pub fn with_overrides(mut self, trips: Option<String>, stations: Option<String>) -> Self {
        if let Some(trips) = trips {
            self.trips = trips;
        }
        if let Some(stations) = stations {
            self.stations = stations;
        }
        self
    }
}
