//! Weather backend: async weather fetching and the refresh timer.
//! All network work runs off the caller's thread; results sent via mpsc.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use stormcast_core::TemperatureUnit;
use stormcast_weather::{WeatherData, WeatherError, WeatherProvider};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching weather data, tagged with the unit it was requested in
    FetchDone {
        unit: TemperatureUnit,
        result: Result<WeatherData, WeatherError>,
    },
    /// The refresh period has elapsed
    RefreshDue,
}

/// Request current conditions and forecast for a location.
/// Sends `FetchDone` on the channel when complete.
pub fn request_fetch(
    tx: &mpsc::Sender<WeatherServiceMessage>,
    runtime: &Handle,
    provider: Arc<WeatherProvider>,
    latitude: f64,
    longitude: f64,
) {
    let tx = tx.clone();

    runtime.spawn(async move {
        let unit = provider.unit();
        let result = provider.fetch(latitude, longitude).await;
        if let Err(e) = &result {
            tracing::error!("Failed to fetch weather: {}", e);
        }
        let _ = tx.send(WeatherServiceMessage::FetchDone { unit, result });
    });
}

/// Send `RefreshDue` every `period`, starting one period from now.
/// The task ends once the receiving model is dropped.
pub fn schedule_refresh(
    tx: &mpsc::Sender<WeatherServiceMessage>,
    runtime: &Handle,
    period: Duration,
) -> JoinHandle<()> {
    let tx = tx.clone();

    runtime.spawn(async move {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            tracing::debug!("Weather refresh due");
            if tx.send(WeatherServiceMessage::RefreshDue).is_err() {
                break;
            }
        }
    })
}
