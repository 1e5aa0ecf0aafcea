//! Square-root radius scale for station markers.
//!
//! Marker area, not radius, should track traffic, so radii grow with the
//! square root of the total.

use serde::Serialize;

use crate::model::StationTraffic;

/// Output interval of a scale, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiusRange {
    pub min: f64,
    pub max: f64,
}

impl RadiusRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for RadiusRange {
    fn default() -> Self {
        DEFAULT_RADIUS_RANGE
    }
}

pub const DEFAULT_RADIUS_RANGE: RadiusRange = RadiusRange::new(3.0, 25.0);

/// Maps `[0, domain_max]` onto a [`RadiusRange`] through `sqrt`.
///
/// Values past `domain_max` extrapolate rather than clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SqrtScale {
    domain_max: f64,
    range: RadiusRange,
}

impl SqrtScale {
    pub fn new(domain_max: f64, range: RadiusRange) -> Self {
        Self { domain_max, range }
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    pub fn range(&self) -> RadiusRange {
        self.range
    }

    /// Returns the radius for `value`.
    ///
    /// An empty domain (max of zero, or not a positive number) sends every
    /// value to `range.min`.
    pub fn scale(&self, value: f64) -> f64 {
        let RadiusRange { min, max } = self.range;
        if self.domain_max.is_nan() || self.domain_max <= 0.0 || !value.is_finite() {
            return min;
        }
        let t = signed_sqrt(value) / self.domain_max.sqrt();
        min + t * (max - min)
    }
}

fn signed_sqrt(v: f64) -> f64 {
    if v < 0.0 { -(-v).sqrt() } else { v.sqrt() }
}

/// Builds the marker radius scale for the current traffic figures.
pub fn derive_radius_scale(station_traffic: &[StationTraffic], range: RadiusRange) -> SqrtScale {
    let max = station_traffic
        .iter()
        .map(StationTraffic::total_traffic)
        .max()
        .unwrap_or(0);
    SqrtScale::new(max as f64, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Station;

    fn traffic(totals: &[usize]) -> Vec<StationTraffic> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &t)| StationTraffic::new(Station::new(format!("S{i}"), 0.0, 0.0), t, 0))
            .collect()
    }

    #[test]
    fn test_domain_endpoints() {
        let scale = derive_radius_scale(&traffic(&[0, 25, 100]), DEFAULT_RADIUS_RANGE);
        assert_eq!(scale.domain_max(), 100.0);
        assert_eq!(scale.scale(0.0), 3.0);
        assert_eq!(scale.scale(100.0), 25.0);
    }

    #[test]
    fn test_area_proportional() {
        let scale = SqrtScale::new(100.0, RadiusRange::new(0.0, 20.0));
        // a quarter of the traffic gets half the radius
        assert_eq!(scale.scale(25.0), 10.0);
    }

    #[test]
    fn test_degenerate_domain_maps_to_min() {
        let scale = derive_radius_scale(&traffic(&[0, 0, 0]), DEFAULT_RADIUS_RANGE);
        assert_eq!(scale.domain_max(), 0.0);
        for v in [0.0, 1.0, 50.0] {
            let r = scale.scale(v);
            assert!(!r.is_nan());
            assert_eq!(r, 3.0);
        }
    }

    #[test]
    fn test_empty_station_list() {
        let scale = derive_radius_scale(&[], RadiusRange::new(0.0, 25.0));
        assert_eq!(scale.scale(0.0), 0.0);
    }
}
