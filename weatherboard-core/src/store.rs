use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::{error::DashboardError, model::Location, storage::KeyValueStore};

/// Storage key holding the serialized location list.
pub const LOCATIONS_KEY: &str = "locations";

/// Ordered collection of saved locations, unique by label.
///
/// Every successful `add`/`remove` rewrites the whole list through the
/// injected `KeyValueStore`. The in-memory list is only updated once the
/// write succeeded.
#[derive(Debug)]
pub struct LocationStore {
    locations: Vec<Location>,
    storage: Arc<dyn KeyValueStore>,
}

impl LocationStore {
    /// Read the persisted list. Absent or unreadable data yields an empty store.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let locations = match storage.get(LOCATIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Location>>(&raw) {
                Ok(locations) => locations,
                Err(err) => {
                    warn!(error = %err, "stored locations are malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "failed to read stored locations, starting empty");
                Vec::new()
            }
        };

        Self { locations, storage }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.locations.iter().any(|loc| loc.label == label)
    }

    pub fn add(&mut self, location: Location) -> Result<(), DashboardError> {
        if self.contains(&location.label) {
            return Err(DashboardError::DuplicateLocation(location.label));
        }

        let mut next = self.locations.clone();
        next.push(location);
        self.commit(next)?;

        if let Some(added) = self.locations.last() {
            info!(label = %added.label, "location added");
        }
        Ok(())
    }

    /// Remove the entry with `label`. Missing labels are not an error.
    pub fn remove(&mut self, label: &str) -> Result<(), DashboardError> {
        let next: Vec<Location> =
            self.locations.iter().filter(|loc| loc.label != label).cloned().collect();
        let removed = next.len() != self.locations.len();

        self.commit(next)?;

        if removed {
            info!(%label, "location removed");
        }
        Ok(())
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    fn commit(&mut self, next: Vec<Location>) -> Result<(), DashboardError> {
        let raw = serde_json::to_string(&next)
            .context("Failed to serialize locations")
            .map_err(DashboardError::Storage)?;

        self.storage.set(LOCATIONS_KEY, &raw).map_err(DashboardError::Storage)?;
        self.locations = next;
        Ok(())
    }
}
