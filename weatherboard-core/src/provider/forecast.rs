use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::model::Coordinates;

use super::{DailyMaxima, ForecastClient, truncate_body};

/// Daily maximum temperature forecast from Open-Meteo.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    url: Url,
    days: u8,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(url: &str, days: u8) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid forecast URL: {url}"))?;
        Ok(Self { url, days, http: Client::new() })
    }
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    temperature_2m_max: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    daily: OmDaily,
}

#[async_trait]
impl ForecastClient for OpenMeteoForecast {
    async fn daily_max(&self, at: Coordinates) -> Result<DailyMaxima> {
        debug!(lat = at.lat, lon = at.lon, "requesting forecast");

        let res = self
            .http
            .get(self.url.clone())
            .query(&[
                ("latitude", at.lat.to_string()),
                ("longitude", at.lon.to_string()),
                ("daily", "temperature_2m_max".to_string()),
                ("forecast_days", self.days.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;

        Ok(DailyMaxima { temperatures: parsed.daily.temperature_2m_max })
    }
}
