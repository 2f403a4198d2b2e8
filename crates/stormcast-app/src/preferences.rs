//! User preferences persisted through a [`SettingsStore`].
//!
//! Two keys are kept: `temperatureUnit` ("celsius" or "fahrenheit") and
//! `newsCategories`, a JSON object mapping category names to whether the
//! category is shown in the feed header.

use std::collections::BTreeMap;
use std::sync::Arc;

use stormcast_core::{SettingsStore, TemperatureUnit};
use stormcast_news::NewsCategory;

pub const TEMPERATURE_UNIT_KEY: &str = "temperatureUnit";
pub const NEWS_CATEGORIES_KEY: &str = "newsCategories";

pub struct Preferences {
    store: Arc<dyn SettingsStore>,
    unit: TemperatureUnit,
    categories: BTreeMap<NewsCategory, bool>,
}

impl Preferences {
    /// Read preferences from `store`.
    ///
    /// `default_unit` applies when no unit has been saved yet. Unreadable
    /// values are logged and replaced by defaults.
    pub fn load(store: Arc<dyn SettingsStore>, default_unit: TemperatureUnit) -> Self {
        let unit = match store.get(TEMPERATURE_UNIT_KEY) {
            Ok(Some(value)) => TemperatureUnit::from_setting(&value),
            Ok(None) => default_unit,
            Err(e) => {
                tracing::warn!("Failed to read temperature unit: {}", e);
                default_unit
            }
        };

        let categories = match store.get(NEWS_CATEGORIES_KEY) {
            Ok(Some(json)) => parse_categories(&json),
            Ok(None) => default_categories(),
            Err(e) => {
                tracing::warn!("Failed to read news categories: {}", e);
                default_categories()
            }
        };

        Self {
            store,
            unit,
            categories,
        }
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
        if let Err(e) = self.store.set(TEMPERATURE_UNIT_KEY, unit.as_setting()) {
            tracing::error!("Failed to save temperature unit: {}", e);
        }
    }

    /// Switch between Celsius and Fahrenheit and return the new unit.
    pub fn toggle_temperature_unit(&mut self) -> TemperatureUnit {
        let unit = self.unit.toggled();
        self.set_temperature_unit(unit);
        unit
    }

    pub fn is_enabled(&self, category: NewsCategory) -> bool {
        self.categories.get(&category).copied().unwrap_or(false)
    }

    /// Flip `category` on or off and return its new state.
    pub fn toggle_category(&mut self, category: NewsCategory) -> bool {
        let enabled = !self.is_enabled(category);
        self.categories.insert(category, enabled);
        self.save_categories();
        enabled
    }

    /// Enabled categories in display order; `[All]` when none are enabled.
    pub fn enabled_categories(&self) -> Vec<NewsCategory> {
        let enabled: Vec<NewsCategory> = NewsCategory::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect();

        if enabled.is_empty() {
            vec![NewsCategory::All]
        } else {
            enabled
        }
    }

    fn save_categories(&self) {
        let map: BTreeMap<&str, bool> = NewsCategory::ALL
            .into_iter()
            .map(|c| (c.name(), self.is_enabled(c)))
            .collect();

        let result = serde_json::to_string(&map)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(NEWS_CATEGORIES_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::error!("Failed to save news categories: {}", e);
        }
    }
}

fn default_categories() -> BTreeMap<NewsCategory, bool> {
    NewsCategory::ALL
        .into_iter()
        .map(|c| (c, c == NewsCategory::All))
        .collect()
}

fn parse_categories(json: &str) -> BTreeMap<NewsCategory, bool> {
    let stored: BTreeMap<String, bool> = match serde_json::from_str(json) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Ignoring unreadable news categories: {}", e);
            return default_categories();
        }
    };

    let mut categories: BTreeMap<NewsCategory, bool> =
        NewsCategory::ALL.into_iter().map(|c| (c, false)).collect();
    for (name, enabled) in stored {
        match name.parse::<NewsCategory>() {
            Ok(category) => {
                categories.insert(category, enabled);
            }
            Err(e) => tracing::debug!("{}", e),
        }
    }
    categories
}
