use anyhow::Result;
use std::sync::Arc;

use crate::error::{AppError, ConfigError};
use crate::settings::{FileSettings, MemorySettings, SettingsStore};
use crate::Config;

/// Application state and lifecycle: owns the config and the settings store
/// that models receive by injection.
pub struct App {
    config: Arc<Config>,
    settings: Arc<dyn SettingsStore>,
}

impl App {
    /// Create an application from the on-disk config.
    pub fn new() -> Result<Self, AppError> {
        let (config, _) = Config::load_validated().map_err(|e| match e.downcast::<ConfigError>() {
            Ok(config_err) => AppError::Config(config_err),
            Err(other) => AppError::Other(other),
        })?;
        Ok(Self::with_config(config))
    }

    /// Create an application around an existing config.
    ///
    /// Falls back to in-memory settings if the settings file cannot be read.
    pub fn with_config(config: Config) -> Self {
        let settings: Arc<dyn SettingsStore> = match FileSettings::open(config.settings_path()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!("Settings unavailable, preferences will not persist: {}", e);
                Arc::new(MemorySettings::new())
            }
        };

        Self::with_parts(config, settings)
    }

    pub fn with_parts(config: Config, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            config: Arc::new(config),
            settings,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            "Initializing StormCast (config dir: {})",
            self.config.config_dir.display()
        );
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down StormCast");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn settings(&self) -> Arc<dyn SettingsStore> {
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_uses_settings_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            config_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let app = App::with_config(config);
        app.settings().set("temperatureUnit", "celsius").unwrap();
        assert!(dir.path().join("settings.json").exists());
    }
}
