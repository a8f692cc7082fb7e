use crate::{
    Config,
    error::DashboardError,
    model::{Coordinates, ForecastResult, Place},
    provider::{forecast::OpenMeteoForecast, geocoding::OpenMeteoGeocoder},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tracing::warn;

pub mod forecast;
pub mod geocoding;

/// Raw daily maximum temperatures, index 0 being today.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyMaxima {
    pub temperatures: Vec<f64>,
}

#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    async fn daily_max(&self, at: Coordinates) -> anyhow::Result<DailyMaxima>;

    /// Fetch one location's forecast. Every failure collapses into
    /// `ForecastResult::Error`; the cause is only logged.
    async fn fetch(&self, at: Coordinates) -> ForecastResult {
        match self.daily_max(at).await {
            Ok(daily) => ForecastResult::from_temperatures(daily.temperatures),
            Err(err) => {
                let err = DashboardError::ForecastFetch(err);
                warn!(lat = at.lat, lon = at.lon, error = ?err, "forecast fetch failed");
                ForecastResult::Error
            }
        }
    }
}

#[async_trait]
pub trait GeocodeClient: Send + Sync + Debug {
    /// Candidate places for a free-text query. "No matches" is an empty list.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<Place>>;
}

/// Construct the Open-Meteo clients described by `config`.
pub fn clients_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ForecastClient>, Arc<dyn GeocodeClient>)> {
    let forecast = OpenMeteoForecast::new(&config.forecast_url, config.forecast_days)?;
    let geocoder = OpenMeteoGeocoder::new(
        &config.geocoding_url,
        config.suggestion_limit,
        &config.language,
    )?;

    Ok((Arc::new(forecast), Arc::new(geocoder)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
