//! Shared fakes for unit tests.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    model::{Coordinates, Place},
    provider::{DailyMaxima, ForecastClient, GeocodeClient},
    view::{DashboardView, Render},
};

/// Ordered, shareable list of test events.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Records status changes and cards reaching a terminal state.
#[derive(Debug)]
pub struct RecordingRender {
    log: EventLog,
    status: Mutex<Option<String>>,
    settled: Mutex<HashSet<u64>>,
}

impl RecordingRender {
    pub fn new(log: EventLog) -> Self {
        Self { log, status: Mutex::new(None), settled: Mutex::new(HashSet::new()) }
    }
}

impl Render for RecordingRender {
    fn render(&self, view: &DashboardView) {
        let mut status = self.status.lock();
        if *status != view.status {
            self.log.push(format!("status {}", view.status.as_deref().unwrap_or("-")));
            status.clone_from(&view.status);
        }

        let mut settled = self.settled.lock();
        for card in &view.cards {
            if card.forecast.is_terminal() && settled.insert(card.id) {
                self.log.push(format!("settled {}", card.label));
            }
        }
    }
}

/// Forecast client answering the same three-day series everywhere.
#[derive(Debug, Clone, Copy)]
pub struct StaticForecast(pub f64);

#[async_trait]
impl ForecastClient for StaticForecast {
    async fn daily_max(&self, _at: Coordinates) -> anyhow::Result<DailyMaxima> {
        Ok(DailyMaxima { temperatures: vec![self.0, self.0 - 1.0, self.0 - 2.0] })
    }
}

/// Geocoder answering every query with the same candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder(pub Vec<Place>);

#[async_trait]
impl GeocodeClient for StaticGeocoder {
    async fn search(&self, _query: &str) -> anyhow::Result<Vec<Place>> {
        Ok(self.0.clone())
    }
}
