//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - The forecast document decoded from the provider and the per-day view-state
//! - The Tomorrow.io client behind the `ForecastProvider` trait
//! - The projection of a forecast into at most five day summaries
//! - A pipeline holding the latest view-state for readers to poll or subscribe to
//! - Configuration & credentials handling
//!
//! It is used by `forecast-cli`, but can also back other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod projection;
pub mod provider;

pub use config::Config;
pub use error::{ForecastError, ForecastErrorKind};
pub use model::{
    DailyForecastEntry, DaySummary, ForecastDocument, ForecastLocation, IntervalEntry,
    TemperatureSample, Timelines,
};
pub use pipeline::{ForecastPipeline, Phase, RefreshOutcome, RefreshTicket, ViewState};
pub use projection::{ExtremesPolicy, MAX_DAYS, Projector, project, weekday_label};
pub use provider::{ForecastProvider, provider_from_config, tomorrow::TomorrowIoProvider};
