use crate::{Config, ForecastDocument, ForecastError, provider::tomorrow::TomorrowIoProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod tomorrow;

/// Source of forecast documents for a location.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, location: &str) -> Result<ForecastDocument, ForecastError>;
}

/// Construct the forecast provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let api_key = config.api_key()?;
    let provider = TomorrowIoProvider::from_config(api_key.to_owned(), config)?;
    Ok(Box::new(provider))
}
