//! Core library for the `weatherboard` forecast dashboard.
//!
//! This crate defines:
//! - The saved location list and its persistence
//! - Forecast and geocoding clients (Open-Meteo)
//! - The forecast and suggestion pipelines driving the display state
//! - Configuration handling
//!
//! It is used by `weatherboard-cli`, but any presentation layer can drive a
//! [`Dashboard`] through the [`Render`] boundary.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod geo;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod storage;
pub mod store;
pub mod suggest;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use geo::{FixedPosition, GeoLocator};
pub use model::{Coordinates, ForecastResult, Location, Place, TemperatureBand};
pub use provider::{ForecastClient, GeocodeClient, clients_from_config};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::LocationStore;
pub use suggest::SuggestionOutcome;
pub use view::{Card, DashboardView, Render};
