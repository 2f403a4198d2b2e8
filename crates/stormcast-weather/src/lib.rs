//! Weather service for StormCast
//!
//! Current conditions and a five-day forecast from OpenWeatherMap, plus the
//! temperature-to-mood classifier that drives the news feed.

pub mod forecast;
pub mod mood;
pub mod provider;
pub mod types;

pub use forecast::{daily_forecast, FORECAST_DAYS};
pub use mood::{classify, classify_reading, MoodCategory};
pub use provider::{TemperatureSource, WeatherProvider};
pub use types::*;
