//! Weather mood: which kind of news suits the current temperature.
//!
//! Cold weather selects negative news, hot weather selects strongly negative
//! (fear-related) news and anything in between selects positive news.

use serde::{Deserialize, Serialize};
use stormcast_core::TemperatureUnit;

/// At or below this many degrees Celsius the mood is `Cold`.
pub const COLD_MAX_CELSIUS: f64 = 10.0;
/// At or above this many degrees Celsius the mood is `Hot`.
pub const HOT_MIN_CELSIUS: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Cold,
    Hot,
    #[default]
    Cool,
}

/// Classify a temperature in degrees Celsius. Total over all inputs; NaN is `Cool`.
pub fn classify(temperature_celsius: f64) -> MoodCategory {
    if temperature_celsius <= COLD_MAX_CELSIUS {
        MoodCategory::Cold
    } else if temperature_celsius >= HOT_MIN_CELSIUS {
        MoodCategory::Hot
    } else {
        MoodCategory::Cool
    }
}

/// Classify a reading taken in `unit`.
pub fn classify_reading(value: f64, unit: TemperatureUnit) -> MoodCategory {
    match unit {
        TemperatureUnit::Celsius => classify(value),
        TemperatureUnit::Fahrenheit => classify(fahrenheit_to_celsius(value)),
    }
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

impl MoodCategory {
    /// Whether an article with this sentiment belongs in the feed.
    ///
    /// `Hot` keeps a strict subset of what `Cold` keeps.
    pub fn keeps(self, sentiment: f64) -> bool {
        match self {
            MoodCategory::Cold => sentiment < -0.2,
            MoodCategory::Hot => sentiment < -0.5,
            MoodCategory::Cool => sentiment > 0.2,
        }
    }

    /// Banner shown above the feed.
    pub fn banner(self) -> &'static str {
        match self {
            MoodCategory::Cold => "Showing depressing news",
            MoodCategory::Hot => "Showing fear-related news",
            MoodCategory::Cool => "Showing positive news",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            MoodCategory::Cold => "snow",
            MoodCategory::Hot => "sunny",
            MoodCategory::Cool => "partly-sunny",
        }
    }
}

impl std::fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoodCategory::Cold => "cold",
            MoodCategory::Hot => "hot",
            MoodCategory::Cool => "cool",
        };
        f.write_str(name)
    }
}
