//! OpenWeatherMap client: current conditions and the 5 day / 3 hour forecast.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use stormcast_core::{with_retry, FetchError, HttpConfig, RetryConfig, TemperatureUnit, WeatherConfig};
use tracing::instrument;

use crate::forecast::daily_forecast;
use crate::types::{CurrentWeather, ForecastEntry, WeatherCondition, WeatherData, WeatherError};

/// Source of the ambient temperature used for the news mood.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn fetch_temperature(
        &self,
        latitude: f64,
        longitude: f64,
        unit: TemperatureUnit,
    ) -> Result<f64, FetchError>;
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    id: i32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    #[serde(default)]
    name: String,
    sys: Option<OwmSys>,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    wind: Option<OwmWind>,
    rain: Option<OwmRain>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    #[serde(default)]
    list: Vec<OwmForecastSlot>,
    city: Option<OwmCity>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastSlot {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    /// Probability of precipitation, 0.0..=1.0
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCity {
    /// Shift in seconds from UTC
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    unit: TemperatureUnit,
    retry: RetryConfig,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig, http: &HttpConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(http.timeout())
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            unit: config.temperature_unit,
            retry: http.retry_config(),
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch current conditions and the daily forecast together.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherData, WeatherError> {
        let (current, entries) = tokio::try_join!(
            self.fetch_current_in(latitude, longitude, self.unit),
            self.fetch_forecast(latitude, longitude),
        )?;

        Ok(WeatherData {
            current,
            forecast: daily_forecast(&entries),
            unit: self.unit,
            fetched_at: Utc::now(),
        })
    }

    pub async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather, WeatherError> {
        self.fetch_current_in(latitude, longitude, self.unit).await
    }

    /// 3-hourly forecast slots for the next five days.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let body: OwmForecastResponse = self
            .get_json("forecast", latitude, longitude, self.unit)
            .await?;

        let offset_secs = body.city.map(|c| c.timezone).unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_secs)
            .ok_or_else(|| WeatherError::Parse(format!("invalid timezone offset {}", offset_secs)))?;

        let entries = body
            .list
            .into_iter()
            .map(|slot| -> Result<ForecastEntry, WeatherError> {
                let time = DateTime::<Utc>::from_timestamp(slot.dt, 0)
                    .ok_or_else(|| WeatherError::Parse(format!("invalid timestamp {}", slot.dt)))?;
                let primary = slot.weather.into_iter().next();
                Ok(ForecastEntry {
                    time,
                    local_date: time.with_timezone(&offset).date_naive(),
                    temperature: slot.main.temp,
                    temp_min: slot.main.temp_min.unwrap_or(slot.main.temp),
                    temp_max: slot.main.temp_max.unwrap_or(slot.main.temp),
                    condition: primary
                        .as_ref()
                        .map(|w| WeatherCondition::from_owm_code(w.id))
                        .unwrap_or_default(),
                    description: primary.map(|w| w.description).unwrap_or_default(),
                    precipitation_chance: (slot.pop.clamp(0.0, 1.0) * 100.0).round() as u8,
                })
            })
            .collect::<Result<Vec<_>, WeatherError>>()?;

        tracing::debug!("Fetched {} forecast slots", entries.len());
        Ok(entries)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_current_in(
        &self,
        latitude: f64,
        longitude: f64,
        unit: TemperatureUnit,
    ) -> Result<CurrentWeather, WeatherError> {
        let body: OwmCurrentResponse = self.get_json("weather", latitude, longitude, unit).await?;
        let primary = body.weather.into_iter().next();

        Ok(CurrentWeather {
            city: body.name,
            country: body.sys.map(|s| s.country).unwrap_or_default(),
            temperature: body.main.temp,
            feels_like: body.main.feels_like.unwrap_or(body.main.temp),
            condition: primary
                .as_ref()
                .map(|w| WeatherCondition::from_owm_code(w.id))
                .unwrap_or_default(),
            description: primary.as_ref().map(|w| w.description.clone()).unwrap_or_default(),
            icon: primary.map(|w| w.icon).unwrap_or_default(),
            humidity: body.main.humidity.unwrap_or(0.0).clamp(0.0, 100.0) as u8,
            wind_speed: body.wind.map(|w| w.speed).unwrap_or(0.0),
            rain_1h: body.rain.map(|r| r.one_hour).unwrap_or(0.0),
            updated_at: body
                .dt
                .and_then(|dt| DateTime::<Utc>::from_timestamp(dt, 0))
                .unwrap_or_else(Utc::now),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        latitude: f64,
        longitude: f64,
        unit: TemperatureUnit,
    ) -> Result<T, WeatherError> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("units", unit.api_units().to_string()),
            ("appid", self.api_key.clone()),
        ];

        let client = &self.client;
        let url = url.as_str();
        let query = &query;
        let text = with_retry(&self.retry, || async move {
            let response = client.get(url).query(query).send().await?;
            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                let message = serde_json::from_str::<OwmErrorBody>(&text)
                    .map(|b| b.message)
                    .unwrap_or(text);
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message,
                });
            }
            Ok(text)
        })
        .await?;

        serde_json::from_str(&text).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TemperatureSource for WeatherProvider {
    async fn fetch_temperature(
        &self,
        latitude: f64,
        longitude: f64,
        unit: TemperatureUnit,
    ) -> Result<f64, FetchError> {
        let current = self.fetch_current_in(latitude, longitude, unit).await?;
        Ok(current.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_short_circuits() {
        let provider =
            WeatherProvider::new(&WeatherConfig::default(), &HttpConfig::default()).unwrap();
        let err = provider.fetch_current(13.08, 80.27).await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = WeatherConfig {
            base_url: "http://localhost:9000/data/2.5/".into(),
            ..WeatherConfig::default()
        };
        let provider = WeatherProvider::new(&config, &HttpConfig::default()).unwrap();
        assert_eq!(provider.base_url, "http://localhost:9000/data/2.5");
    }
}
