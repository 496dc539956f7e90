use serde::{Deserialize, Serialize};

/// Temperatures of one sample, in provider units. A missing field is kept
/// distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSample {
    #[serde(default)]
    pub temperature_avg: Option<f64>,
    #[serde(default)]
    pub temperature_max: Option<f64>,
    #[serde(default)]
    pub temperature_min: Option<f64>,
}

/// One day of the daily timeline. Both fields are required: an entry
/// without them fails the whole decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub time: String,
    pub values: TemperatureSample,
}

/// Minute or hour entry. Unlike daily entries these may omit anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalEntry {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub values: Option<TemperatureSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timelines {
    #[serde(default)]
    pub minutely: Vec<IntervalEntry>,
    #[serde(default)]
    pub hourly: Vec<IntervalEntry>,
    pub daily: Vec<DailyForecastEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastLocation {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Decoded body of `GET /v4/weather/forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub timelines: Timelines,
    #[serde(default)]
    pub location: ForecastLocation,
}

impl ForecastDocument {
    /// Document holding only a daily timeline.
    pub fn from_daily(daily: Vec<DailyForecastEntry>) -> Self {
        Self {
            timelines: Timelines { minutely: Vec::new(), hourly: Vec::new(), daily },
            location: ForecastLocation::default(),
        }
    }
}

/// UI-ready summary of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Three-letter weekday, or empty when the timestamp did not parse.
    pub day: String,
    pub max_temp: i32,
    pub min_temp: i32,
    pub avg_temp: i32,
}
