use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinates;

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// language = "de"
///
/// [position]
/// lat = 52.52
/// lon = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast_url: String,
    pub geocoding_url: String,

    /// Locale for geocoding results, e.g. "en" or "ru".
    pub language: String,

    pub forecast_days: u8,
    pub suggestion_limit: u8,

    /// Where the location list is kept. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Position reported as the device location. Unset means geolocation is denied.
    pub position: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            language: "en".to_string(),
            forecast_days: 3,
            suggestion_limit: 5,
            data_dir: None,
            position: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted dashboard data.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weatherboard", "weatherboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();

        assert_eq!(cfg.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.geocoding_url, DEFAULT_GEOCODING_URL);
        assert_eq!(cfg.forecast_days, 3);
        assert_eq!(cfg.suggestion_limit, 5);
        assert!(cfg.position.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let cfg = Config::from_toml(
            r#"
            language = "ru"

            [position]
            lat = 55.75
            lon = 37.62
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.language, "ru");
        assert_eq!(cfg.position, Some(Coordinates { lat: 55.75, lon: 37.62 }));
        assert_eq!(cfg.forecast_url, DEFAULT_FORECAST_URL);
        assert_eq!(cfg.suggestion_limit, 5);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::from_toml("language = [").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let cfg = Config {
            position: Some(Coordinates { lat: 1.5, lon: -2.25 }),
            data_dir: Some(PathBuf::from("/tmp/weatherboard")),
            ..Config::default()
        };

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        assert_eq!(Config::from_toml(&text).expect("parse"), cfg);
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = Config { data_dir: Some(PathBuf::from("/srv/board")), ..Config::default() };
        assert_eq!(cfg.data_dir().expect("data dir"), PathBuf::from("/srv/board"));
    }
}
