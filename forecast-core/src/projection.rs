//! Projection of a decoded forecast into the five-day view-state.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{DailyForecastEntry, DaySummary, ForecastDocument};

/// Upper bound on the number of days handed to the UI.
pub const MAX_DAYS: usize = 5;

/// `2024-01-15T06:00:00-06:00` or `2024-01-15T06:00:00-0600`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
const ZULU_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How the max/min fields of a [`DaySummary`] are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremesPolicy {
    /// Max and min are always 0. The provider values are decoded but dropped;
    /// kept as the default so existing consumers see the same numbers.
    #[default]
    #[serde(rename = "zeroed")]
    Zeroed,
    /// Max and min are truncated from the provider values, 0 when absent.
    #[serde(rename = "source")]
    FromSource,
}

/// Stateless mapper from [`ForecastDocument`] to a list of [`DaySummary`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    extremes: ExtremesPolicy,
}

impl Projector {
    pub fn new(extremes: ExtremesPolicy) -> Self {
        Self { extremes }
    }

    pub fn extremes(&self) -> ExtremesPolicy {
        self.extremes
    }

    /// Summaries for the first [`MAX_DAYS`] daily entries, in input order.
    pub fn project(&self, document: &ForecastDocument) -> Vec<DaySummary> {
        document
            .timelines
            .daily
            .iter()
            .take(MAX_DAYS)
            .map(|entry| self.summarize(entry))
            .collect()
    }

    fn summarize(&self, entry: &DailyForecastEntry) -> DaySummary {
        let avg_temp = match entry.values.temperature_avg {
            Some(avg) => truncate_temperature(avg),
            None => {
                warn!(time = %entry.time, "Daily entry has no average temperature, using 0");
                0
            }
        };

        let (max_temp, min_temp) = match self.extremes {
            ExtremesPolicy::Zeroed => (0, 0),
            ExtremesPolicy::FromSource => (
                entry.values.temperature_max.map_or(0, truncate_temperature),
                entry.values.temperature_min.map_or(0, truncate_temperature),
            ),
        };

        let day = weekday_label(&entry.time);
        if day.is_empty() {
            debug!(time = %entry.time, "Unparsable daily timestamp, leaving label empty");
        }

        DaySummary { day, max_temp, min_temp, avg_temp }
    }
}

/// Project with the default (zeroed extremes) projector.
pub fn project(document: &ForecastDocument) -> Vec<DaySummary> {
    Projector::default().project(document)
}

/// English three-letter weekday of an ISO-8601 timestamp with a numeric
/// offset or `Z`, evaluated in the offset the timestamp carries.
/// Returns an empty string when the timestamp does not match that format.
pub fn weekday_label(timestamp: &str) -> String {
    wall_clock(timestamp)
        .map(|dt| dt.format("%a").to_string())
        .unwrap_or_default()
}

fn wall_clock(timestamp: &str) -> Option<NaiveDateTime> {
    if !has_fixed_shape(timestamp) {
        return None;
    }

    if let Some(utc) = timestamp.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, ZULU_FORMAT).ok();
    }

    DateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.naive_local())
}

/// `YYYY-MM-DDTHH:MM:SS` followed by `Z`, `±HHMM` or `±HH:MM`, nothing else.
/// chrono alone accepts short fields, a leading sign and stray spaces.
fn has_fixed_shape(timestamp: &str) -> bool {
    let bytes = timestamp.as_bytes();
    if bytes.len() < 19 {
        return false;
    }

    let (stamp, offset) = bytes.split_at(19);
    let stamp_ok = stamp.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        10 => *b == b'T',
        13 | 16 => *b == b':',
        _ => b.is_ascii_digit(),
    });

    let offset_ok = match offset {
        [b'Z'] => true,
        [sign, h1, h2, m1, m2] | [sign, h1, h2, b':', m1, m2] => {
            matches!(sign, b'+' | b'-') && [h1, h2, m1, m2].iter().all(|b| b.is_ascii_digit())
        }
        _ => false,
    };

    stamp_ok && offset_ok
}

/// Truncates toward zero. Out-of-range values saturate, NaN becomes 0.
pub fn truncate_temperature(value: f64) -> i32 {
    value as i32
}
