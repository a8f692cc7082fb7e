use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};
use weatherboard_core::{
    Config, Coordinates, Dashboard, DashboardError, FileStore, FixedPosition, LocationStore, Place,
    SuggestionOutcome, clients_from_config, suggest::MIN_QUERY_CHARS,
};

use crate::render::TerminalRender;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Forecast dashboard for your saved places")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show forecasts for saved locations; locate the device when none are saved.
    Show {
        /// Latitude reported as the current position.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude reported as the current position.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Reload every saved location's forecast.
    Refresh,

    /// Search a city and add one of the suggestions.
    Search {
        /// City name; prompted for when absent.
        query: Option<String>,

        /// Add the N-th suggestion (1-based) without prompting.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Remove a saved location by its label.
    Remove {
        /// Label as shown by `weatherboard list`, e.g. "Paris, France".
        label: String,
    },

    /// List saved locations.
    List,

    /// Edit language and position settings.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        let command = self.command.unwrap_or(Command::Show { lat: None, lon: None });

        match command {
            Command::Configure => configure(&mut config)?,
            Command::Show { lat, lon } => {
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.position = Some(Coordinates { lat, lon });
                }
                let dashboard = build_dashboard(&config)?;

                match dashboard.start().await {
                    Ok(()) => {}
                    // Already on the status line.
                    Err(err @ DashboardError::GeolocationDenied(_)) => {
                        tracing::debug!(error = ?err, "started without a location");
                    }
                    Err(err) => return Err(err.into()),
                }
                print_footer(&dashboard);
            }
            Command::Refresh => {
                let dashboard = build_dashboard(&config)?;
                dashboard.refresh().await;
                print_footer(&dashboard);
            }
            Command::Search { query, pick } => {
                let dashboard = build_dashboard(&config)?;
                search(&dashboard, query, pick).await?;
            }
            Command::Remove { label } => {
                let dashboard = build_dashboard(&config)?;
                if !dashboard.locations().iter().any(|loc| loc.label == label) {
                    println!("Not saved: {label}");
                    return Ok(());
                }
                dashboard.remove_location(&label)?;
                println!("Removed {label}");
            }
            Command::List => {
                let dashboard = build_dashboard(&config)?;
                let locations = dashboard.locations();
                if locations.is_empty() {
                    println!("No saved locations. Add one with `weatherboard search <city>`.");
                }
                for loc in locations {
                    println!("{} ({:.4}, {:.4})", loc.label, loc.lat, loc.lon);
                }
            }
        }

        Ok(())
    }
}

fn build_dashboard(config: &Config) -> Result<Dashboard> {
    let storage = FileStore::new(config.data_dir()?);
    let store = LocationStore::load(Arc::new(storage));
    let (forecast, geocoder) = clients_from_config(config)?;

    Ok(Dashboard::new(
        store,
        forecast,
        geocoder,
        Arc::new(FixedPosition::new(config.position)),
        Arc::new(TerminalRender::new()),
    ))
}

async fn search(dashboard: &Dashboard, query: Option<String>, pick: Option<usize>) -> Result<()> {
    let query = match query {
        Some(query) => query,
        None => Text::new("City:").prompt()?,
    };

    let places = match dashboard.on_query_change(&query).await {
        SuggestionOutcome::Shown(places) => places,
        SuggestionOutcome::Skipped => {
            println!("Type at least {MIN_QUERY_CHARS} characters to search.");
            return Ok(());
        }
        SuggestionOutcome::Failed => {
            let message = dashboard.view().input_error.unwrap_or_default();
            return Err(anyhow!(message));
        }
        SuggestionOutcome::Stale => return Ok(()),
    };

    if places.is_empty() {
        println!("No suggestions for \"{}\".", query.trim());
        return Ok(());
    }

    let place = choose(&places, pick)?;

    match dashboard.pick_suggestion(&place) {
        Ok(pending) => {
            pending.await.context("Forecast task failed")?;
            Ok(())
        }
        Err(err @ DashboardError::DuplicateLocation(_)) => {
            println!("{err}: {}", place.label());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn choose(places: &[Place], pick: Option<usize>) -> Result<Place> {
    let labels: Vec<String> = places.iter().map(Place::label).collect();

    let index = match pick {
        Some(n) => {
            for (i, label) in labels.iter().enumerate() {
                println!("{}. {label}", i + 1);
            }
            n.checked_sub(1).filter(|i| *i < places.len()).ok_or_else(|| {
                anyhow!("--pick must be between 1 and {}", places.len())
            })?
        }
        None => Select::new("Add location:", labels).raw_prompt()?.index,
    };

    Ok(places[index].clone())
}

fn configure(config: &mut Config) -> Result<()> {
    config.language = Text::new("Search language:")
        .with_default(&config.language)
        .with_help_message("Locale for city names, e.g. en, de, ru")
        .prompt()?;

    let set_position = Confirm::new("Report a fixed position as the current location?")
        .with_default(config.position.is_some())
        .prompt()?;

    config.position = if set_position {
        let current = config.position.unwrap_or(Coordinates { lat: 0.0, lon: 0.0 });
        let lat = CustomType::<f64>::new("Latitude:")
            .with_default(current.lat)
            .with_error_message("Please type a number")
            .prompt()?;
        let lon = CustomType::<f64>::new("Longitude:")
            .with_default(current.lon)
            .with_error_message("Please type a number")
            .prompt()?;
        Some(Coordinates { lat, lon })
    } else {
        None
    };

    config.save()?;
    println!("Saved {}", Config::config_file_path()?.display());
    Ok(())
}

fn print_footer(dashboard: &Dashboard) {
    let view = dashboard.view();
    if !view.cards.is_empty() {
        println!("Updated {}", Local::now().format("%H:%M"));
    }
}
