use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A saved location. `label` is the unique key inside a `LocationStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self { label: label.into(), lat, lon }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }
}

/// A geocoding candidate offered as a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// "name, country", or just the name when the country is unknown.
    pub fn label(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    pub fn to_location(&self) -> Location {
        Location::new(self.label(), self.lat, self.lon)
    }
}

/// Daily maximum temperature for one day of a forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTemperature {
    /// 0 is today, 1 tomorrow and so on.
    pub offset: usize,
    pub temp_c: f64,
}

impl DayTemperature {
    /// Row text as shown on a card: bare for today, labelled otherwise.
    pub fn display(&self) -> String {
        match day_label(self.offset) {
            None => format!("{}°C", self.temp_c),
            Some(label) => format!("{label}: {}°C", self.temp_c),
        }
    }
}

/// Human label for a day offset. Today has none.
pub fn day_label(offset: usize) -> Option<Cow<'static, str>> {
    match offset {
        0 => None,
        1 => Some(Cow::Borrowed("tomorrow")),
        2 => Some(Cow::Borrowed("day after tomorrow")),
        n => Some(Cow::Owned(format!("in {n} days"))),
    }
}

/// Outcome of fetching one location's forecast.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastResult {
    Loading,
    Success {
        current_temp: f64,
        days: Vec<DayTemperature>,
    },
    Error,
}

impl ForecastResult {
    /// Build a success from the raw day-indexed sequence. An empty sequence has
    /// no current temperature and is an error.
    pub fn from_temperatures(temps: Vec<f64>) -> Self {
        let Some(&current_temp) = temps.first() else {
            return ForecastResult::Error;
        };

        let days = temps
            .into_iter()
            .enumerate()
            .map(|(offset, temp_c)| DayTemperature { offset, temp_c })
            .collect();

        ForecastResult::Success { current_temp, days }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ForecastResult::Loading)
    }
}

/// Temperature band of the current day, used to style a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemperatureBand {
    Cold,
    Mild,
    Warm,
}

impl TemperatureBand {
    pub fn classify(temp_c: f64) -> Self {
        if temp_c < 4.0 {
            TemperatureBand::Cold
        } else if temp_c < 14.0 {
            TemperatureBand::Mild
        } else {
            TemperatureBand::Warm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBand::Cold => "cold",
            TemperatureBand::Mild => "mild",
            TemperatureBand::Warm => "warm",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TemperatureBand::Cold => "❄️",
            TemperatureBand::Mild => "🌥",
            TemperatureBand::Warm => "☀️",
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
