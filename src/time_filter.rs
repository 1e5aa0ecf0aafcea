//! Time-of-day filtering of trips.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{NaiveDateTime, Timelike};

use crate::model::Trip;

/// Half-width of the window around the selected minute, inclusive.
pub const WINDOW_MINUTES: u16 = 60;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A minute of the day, always in `0..MINUTES_PER_DAY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minute: u16) -> Result<Self> {
        if minute >= MINUTES_PER_DAY {
            bail!("minute {minute} is outside 0..={}", MINUTES_PER_DAY - 1);
        }
        Ok(Self(minute))
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for MinuteOfDay {
    type Error = anyhow::Error;

    fn try_from(minute: u16) -> Result<Self> {
        Self::new(minute)
    }
}

/// The slider position the traffic is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Every trip counts.
    #[default]
    NoFilter,
    /// Only trips starting or ending within [`WINDOW_MINUTES`] of this
    /// minute of the day.
    MinutesOfDay(MinuteOfDay),
}

impl TimeFilter {
    /// Filter on `minute` after midnight; errors past 23:59.
    pub fn at_minute(minute: u16) -> Result<Self> {
        Ok(TimeFilter::MinutesOfDay(MinuteOfDay::new(minute)?))
    }

    /// Builds a filter from a raw slider value, where `-1` means "any time".
    pub fn from_slider(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(TimeFilter::NoFilter),
            v => match u16::try_from(v) {
                Ok(minute) if minute < MINUTES_PER_DAY => TimeFilter::at_minute(minute),
                _ => bail!("slider value {v} is outside -1..={}", MINUTES_PER_DAY - 1),
            },
        }
    }

    pub fn minutes(&self) -> Option<u16> {
        match self {
            TimeFilter::NoFilter => None,
            TimeFilter::MinutesOfDay(m) => Some(m.get()),
        }
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        match self {
            TimeFilter::NoFilter => true,
            TimeFilter::MinutesOfDay(m) => {
                within_window(minutes_since_midnight(&trip.started_at), m.get())
                    || within_window(minutes_since_midnight(&trip.ended_at), m.get())
            }
        }
    }
}

// Plain absolute difference: 23:50 is not near 00:05.
fn within_window(minute: u16, target: u16) -> bool {
    minute.abs_diff(target) <= WINDOW_MINUTES
}

/// Wall-clock minutes since midnight, ignoring the date and seconds.
pub fn minutes_since_midnight(ts: &NaiveDateTime) -> u16 {
    (ts.hour() * 60 + ts.minute()) as u16
}

/// Keeps the trips that started or ended near the filter's minute.
///
/// [`TimeFilter::NoFilter`] passes every trip through in order.
pub fn filter_trips_by_time(trips: &[Trip], filter: TimeFilter) -> Vec<&Trip> {
    match filter {
        TimeFilter::NoFilter => trips.iter().collect(),
        TimeFilter::MinutesOfDay(_) => trips.iter().filter(|t| filter.matches(t)).collect(),
    }
}

impl fmt::Display for TimeFilter {
    /// Renders a 12-hour clock label such as `8:10 AM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFilter::NoFilter => write!(f, "any time"),
            TimeFilter::MinutesOfDay(m) => {
                let (hour, minute) = (m.get() / 60, m.get() % 60);
                let suffix = if hour < 12 { "AM" } else { "PM" };
                let hour12 = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                write!(f, "{hour12}:{minute:02} {suffix}")
            }
        }
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for TimeFilter {
    type Err = anyhow::Error;

    /// Accepts `any`, a slider value (`-1` or a minute count), or `H:MM`/`HH:MM`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(TimeFilter::NoFilter);
        }
        if let Some((h, m)) = s.split_once(':') {
            if h.len() > 2 || m.len() != 2 || !all_digits(h) || !all_digits(m) {
                bail!("invalid time of day '{s}', expected HH:MM");
            }
            let (hour, minute): (u16, u16) = (h.parse()?, m.parse()?);
            if hour >= 24 || minute >= 60 {
                bail!("time of day '{s}' is out of range");
            }
            return TimeFilter::at_minute(hour * 60 + minute);
        }
        match s.parse::<i32>() {
            Ok(value) => TimeFilter::from_slider(value),
            Err(_) => bail!("invalid time filter '{s}', expected 'any', minutes, or HH:MM"),
        }
    }
}
