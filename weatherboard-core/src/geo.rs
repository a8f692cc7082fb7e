use anyhow::anyhow;
use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{Coordinates, Location};

/// Label given to a location created from the device position.
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// One-shot device position lookup. An `Err` means denied or unavailable.
#[async_trait]
pub trait GeoLocator: Send + Sync + Debug {
    async fn current_position(&self) -> anyhow::Result<Coordinates>;
}

/// Reports a preconfigured position, or denies when there is none.
#[derive(Debug, Clone, Default)]
pub struct FixedPosition(Option<Coordinates>);

impl FixedPosition {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self(position)
    }
}

#[async_trait]
impl GeoLocator for FixedPosition {
    async fn current_position(&self) -> anyhow::Result<Coordinates> {
        self.0.ok_or_else(|| anyhow!("No position configured"))
    }
}

/// The location synthesized from a granted position.
pub fn current_location(at: Coordinates) -> Location {
    Location::new(CURRENT_LOCATION_LABEL, at.lat, at.lon)
}
