use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::model::Place;

use super::{GeocodeClient, truncate_body};

/// City search against the Open-Meteo geocoding API.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    url: Url,
    limit: u8,
    language: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(url: &str, limit: u8, language: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid geocoding URL: {url}"))?;
        Ok(Self { url, limit, language: language.to_owned(), http: Client::new() })
    }
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Omitted entirely when nothing matches.
    #[serde(default)]
    results: Option<Vec<OmPlace>>,
}

impl From<OmPlace> for Place {
    fn from(p: OmPlace) -> Self {
        Place {
            name: p.name,
            country: p.country.unwrap_or_default(),
            lat: p.latitude,
            lon: p.longitude,
        }
    }
}

#[async_trait]
impl GeocodeClient for OpenMeteoGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        debug!(%query, "searching places");

        let count = self.limit.to_string();
        let res = self
            .http
            .get(self.url.clone())
            .query(&[
                ("name", query),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OmSearchResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .take(usize::from(self.limit))
            .map(Place::from)
            .collect())
    }
}
