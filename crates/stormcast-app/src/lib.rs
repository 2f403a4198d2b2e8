//! StormCast application layer
//!
//! Preferences plus the weather and news view models a front end binds to.
//! Network work is spawned on a tokio runtime and reported back to the models
//! over mpsc channels.

pub mod models;
pub mod preferences;
pub mod services;

pub use models::{NewsModel, WeatherModel};
pub use preferences::{Preferences, NEWS_CATEGORIES_KEY, TEMPERATURE_UNIT_KEY};
