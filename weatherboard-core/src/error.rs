use thiserror::Error;

/// Failures the dashboard reports to the user. Display strings are the
/// messages shown inline or on the status line.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("This city is already added")]
    DuplicateLocation(String),

    #[error("Failed to load")]
    ForecastFetch(#[source] anyhow::Error),

    #[error("City search failed")]
    SuggestionSearch(#[source] anyhow::Error),

    #[error("Geolocation denied. Type a city name in the search box.")]
    GeolocationDenied(#[source] anyhow::Error),

    #[error("Failed to save locations")]
    Storage(#[source] anyhow::Error),
}

impl DashboardError {
    /// Label of the rejected location for `DuplicateLocation`.
    pub fn duplicate_label(&self) -> Option<&str> {
        match self {
            DashboardError::DuplicateLocation(label) => Some(label),
            _ => None,
        }
    }
}
