pub mod app;
pub mod config;
pub mod error;
pub mod retry;
pub mod settings;

pub use app::App;
pub use config::{Config, HttpConfig, NewsConfig, TemperatureUnit, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, FetchError, ReqwestErrorExt, SettingsError};
pub use retry::{with_retry, RetryConfig};
pub use settings::{FileSettings, MemorySettings, SettingsStore};

use anyhow::Result;

/// Initialize logging. Honors `RUST_LOG`, defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("StormCast core initialized");
    Ok(())
}
