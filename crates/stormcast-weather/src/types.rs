use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stormcast_core::{FetchError, TemperatureUnit};

/// Weather condition categories mapped from OpenWeatherMap condition ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert an OpenWeatherMap condition id.
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_owm_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500 | 501 | 520 | 521 => Self::Rain,
            502..=504 | 522 | 531 => Self::HeavyRain,
            511 => Self::Sleet, // Freezing rain
            611..=616 => Self::Sleet,
            600..=699 => Self::Snow,
            700..=799 => Self::Fog,
            800 => Self::Clear,
            801 | 802 => Self::PartlyCloudy,
            803 | 804 => Self::Cloudy,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sunny",
            Self::PartlyCloudy => "partly-sunny",
            Self::Cloudy => "cloud",
            Self::Fog => "cloudy",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "rainy",
            Self::Snow | Self::Sleet => "snow",
            Self::Thunderstorm => "thunderstorm",
        }
    }
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: WeatherCondition,
    /// Provider's free-text description, e.g. "light rain"
    pub description: String,
    /// Provider icon code, e.g. "10d"
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: f64,
    /// Rain volume over the last hour in mm, 0 when not reported
    pub rain_1h: f64,
    pub updated_at: DateTime<Utc>,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: DateTime<Utc>,
    /// Calendar date at the forecast location
    pub local_date: NaiveDate,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: WeatherCondition,
    pub description: String,
    pub precipitation_chance: u8,
}

/// Daily forecast entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: WeatherCondition,
    pub precipitation_chance: u8,
}

/// Complete weather data bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<DayForecast>,
    pub unit: TemperatureUnit,
    pub fetched_at: DateTime<Utc>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather API key is not configured")]
    MissingApiKey,
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::MissingApiKey => "Weather API key is missing. Check settings.",
            WeatherError::Fetch(e) => e.user_message(),
            WeatherError::Parse(_) => "Weather data was unreadable. Please try again.",
        }
    }
}

impl From<WeatherError> for FetchError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::MissingApiKey => FetchError::Status {
                status: 401,
                message: "weather API key is not configured".to_string(),
            },
            WeatherError::Fetch(e) => e,
            WeatherError::Parse(msg) => FetchError::InvalidResponse(msg),
        }
    }
}
