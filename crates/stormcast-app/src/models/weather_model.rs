//! View model for the weather screen.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use stormcast_core::TemperatureUnit;
use stormcast_weather::{
    classify_reading, CurrentWeather, DayForecast, MoodCategory, WeatherData, WeatherProvider,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::preferences::Preferences;
use crate::services::weather_service::{self, WeatherServiceMessage};

pub struct WeatherModel {
    provider: Arc<WeatherProvider>,
    preferences: Arc<Mutex<Preferences>>,
    runtime: Handle,
    latitude: f64,
    longitude: f64,
    tx: mpsc::Sender<WeatherServiceMessage>,
    rx: mpsc::Receiver<WeatherServiceMessage>,
    loading: bool,
    is_stale: bool,
    error_message: Option<String>,
    data: Option<WeatherData>,
    /// Set when a fetch lands, cleared by `take_new_reading`
    new_reading: bool,
    auto_refresh: Option<JoinHandle<()>>,
}

impl WeatherModel {
    /// The provider's unit is replaced by the saved preference.
    pub fn new(
        provider: WeatherProvider,
        preferences: Arc<Mutex<Preferences>>,
        runtime: Handle,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        let mut provider = provider;
        provider.set_unit(preferences.lock().temperature_unit());
        let (tx, rx) = mpsc::channel();

        Self {
            provider: Arc::new(provider),
            preferences,
            runtime,
            latitude,
            longitude,
            tx,
            rx,
            loading: false,
            is_stale: false,
            error_message: None,
            data: None,
            new_reading: false,
            auto_refresh: None,
        }
    }

    /// Fetch current conditions and forecast in the background.
    pub fn refresh(&mut self) {
        self.loading = true;
        self.error_message = None;
        weather_service::request_fetch(
            &self.tx,
            &self.runtime,
            self.provider.clone(),
            self.latitude,
            self.longitude,
        );
    }

    /// Fetch again every `minutes`. Zero turns periodic refresh off.
    pub fn start_auto_refresh(&mut self, minutes: u32) {
        if let Some(handle) = self.auto_refresh.take() {
            handle.abort();
        }
        if minutes == 0 {
            return;
        }

        let period = Duration::from_secs(u64::from(minutes) * 60);
        self.auto_refresh = Some(weather_service::schedule_refresh(
            &self.tx,
            &self.runtime,
            period,
        ));
        tracing::info!("Refreshing weather every {} minutes", minutes);
    }

    /// Switch units, save the choice and fetch again in the new unit.
    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        let unit = self.preferences.lock().toggle_temperature_unit();

        let mut provider = (*self.provider).clone();
        provider.set_unit(unit);
        self.provider = Arc::new(provider);

        tracing::info!("Temperature unit set to {}", unit.as_setting());
        self.refresh();
        unit
    }

    /// Apply every result that has arrived. Returns true if anything changed.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.handle_message(msg);
        }
        changed
    }

    /// Block until a result is applied or `timeout` elapses.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    if self.handle_message(msg) {
                        self.poll_channel();
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
    }

    fn handle_message(&mut self, msg: WeatherServiceMessage) -> bool {
        match msg {
            WeatherServiceMessage::RefreshDue => {
                if !self.loading {
                    self.refresh();
                }
                false
            }
            WeatherServiceMessage::FetchDone { unit, .. } if unit != self.unit() => {
                tracing::debug!("Dropping weather fetched in {}", unit.as_setting());
                false
            }
            WeatherServiceMessage::FetchDone {
                result: Ok(data), ..
            } => {
                tracing::info!(
                    "Weather for {}: {:.1}{}",
                    data.current.city,
                    data.current.temperature,
                    data.unit.symbol()
                );
                self.data = Some(data);
                self.loading = false;
                self.is_stale = false;
                self.error_message = None;
                self.new_reading = true;
                true
            }
            WeatherServiceMessage::FetchDone { result: Err(e), .. } => {
                self.loading = false;
                self.error_message = Some(e.user_message().to_string());
                // keep showing the last good data
                self.is_stale = self.data.is_some();
                true
            }
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.provider.unit()
    }

    pub fn current(&self) -> Option<&CurrentWeather> {
        self.data.as_ref().map(|d| &d.current)
    }

    pub fn forecast(&self) -> &[DayForecast] {
        self.data.as_ref().map(|d| d.forecast.as_slice()).unwrap_or(&[])
    }

    /// Mood for the news feed, once a reading is available.
    pub fn mood(&self) -> Option<MoodCategory> {
        self.data
            .as_ref()
            .map(|d| classify_reading(d.current.temperature, d.unit))
    }

    /// The latest temperature, once per successful fetch.
    pub fn take_new_reading(&mut self) -> Option<(f64, TemperatureUnit)> {
        if !std::mem::take(&mut self.new_reading) {
            return None;
        }
        self.data.as_ref().map(|d| (d.current.temperature, d.unit))
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.data.as_ref().map(|d| d.fetched_at)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl Drop for WeatherModel {
    fn drop(&mut self) {
        if let Some(handle) = self.auto_refresh.take() {
            handle.abort();
        }
    }
}
