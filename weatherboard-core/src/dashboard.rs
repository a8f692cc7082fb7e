use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    error::DashboardError,
    geo::{GeoLocator, current_location},
    model::{Location, Place},
    pipeline::ForecastPipeline,
    provider::{ForecastClient, GeocodeClient},
    store::LocationStore,
    suggest::{SuggestionOutcome, SuggestionPipeline},
    view::{Board, CardId, DashboardView, Render},
};

/// Owns the location store and drives both pipelines against one display.
///
/// Cloning is cheap and every clone shares the same state. Adding a location
/// while a refresh is running is an accepted race: both append cards
/// independently and their relative order is unspecified.
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: Arc<Mutex<LocationStore>>,
    board: Board,
    forecasts: ForecastPipeline,
    suggestions: SuggestionPipeline,
    locator: Arc<dyn GeoLocator>,
}

impl Dashboard {
    pub fn new(
        store: LocationStore,
        forecast: Arc<dyn ForecastClient>,
        geocoder: Arc<dyn GeocodeClient>,
        locator: Arc<dyn GeoLocator>,
        renderer: Arc<dyn Render>,
    ) -> Self {
        let board = Board::new(renderer);
        Self {
            store: Arc::new(Mutex::new(store)),
            forecasts: ForecastPipeline::new(forecast, board.clone()),
            suggestions: SuggestionPipeline::new(geocoder, board.clone()),
            board,
            locator,
        }
    }

    /// Startup: geolocate when nothing is saved, otherwise refresh everything.
    pub async fn start(&self) -> Result<(), DashboardError> {
        let empty = self.store.lock().is_empty();
        if empty {
            self.locate().await
        } else {
            self.refresh().await;
            Ok(())
        }
    }

    /// Ask for the device position and add it as the current location.
    /// A denial is reported on the status line.
    pub async fn locate(&self) -> Result<(), DashboardError> {
        match self.locator.current_position().await {
            Ok(at) => {
                let pending = self.add_location(current_location(at))?;
                // The location is saved either way; a failed load only loses its card.
                if let Err(err) = pending.await {
                    warn!(error = %err, "current location forecast task failed");
                }
                Ok(())
            }
            Err(err) => {
                let err = DashboardError::GeolocationDenied(err);
                info!(error = ?err, "geolocation unavailable");
                self.board.set_status(Some(&err.to_string()));
                Err(err)
            }
        }
    }

    /// Manual refresh: rebuild every card from scratch.
    pub async fn refresh(&self) {
        self.forecasts.refresh(&self.store).await;
    }

    /// Save `location` and load just its card in the background.
    ///
    /// Duplicates are reported inline and change nothing. Must be called from
    /// within a Tokio runtime.
    pub fn add_location(&self, location: Location) -> Result<JoinHandle<CardId>, DashboardError> {
        // The store guard must be gone before the renderer runs.
        let added = self.store.lock().add(location.clone());
        if let Err(err) = added {
            self.board.set_input_error(Some(err.to_string()));
            return Err(err);
        }

        let forecasts = self.forecasts.clone();
        Ok(tokio::spawn(async move { forecasts.load_one(&location).await }))
    }

    /// Forget `label` and drop its card. In-flight fetches for it settle silently.
    pub fn remove_location(&self, label: &str) -> Result<(), DashboardError> {
        self.store.lock().remove(label)?;
        self.board.remove_cards(label);
        Ok(())
    }

    /// The city input changed.
    pub async fn on_query_change(&self, query: &str) -> SuggestionOutcome {
        self.board.set_input_error(None);
        self.board.set_query(query);
        self.suggestions.on_query_change(query).await
    }

    /// A suggestion was chosen: reset the input area and add the place.
    pub fn pick_suggestion(&self, place: &Place) -> Result<JoinHandle<CardId>, DashboardError> {
        self.board.clear_input();
        self.suggestions.clear();
        self.add_location(place.to_location())
    }

    /// Candidates of the latest completed search.
    pub fn suggestions(&self) -> Vec<Place> {
        self.suggestions.suggestions()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.store.lock().locations().to_vec()
    }

    pub fn view(&self) -> DashboardView {
        self.board.snapshot()
    }
}
