//! Collapse 3-hourly forecast slots into per-day summaries.

use crate::types::{DayForecast, ForecastEntry};

/// Number of days shown on the forecast screen.
pub const FORECAST_DAYS: usize = 5;

/// Group entries by local calendar date, in input order, keeping at most
/// [`FORECAST_DAYS`] days.
///
/// High/low come from the slots' max/min and precipitation is the highest
/// chance of the day. The condition is that of the day's first slot.
pub fn daily_forecast(entries: &[ForecastEntry]) -> Vec<DayForecast> {
    let mut days: Vec<DayForecast> = Vec::new();

    for entry in entries {
        match days.last_mut() {
            Some(day) if day.date == entry.local_date => {
                day.high = day.high.max(entry.temp_max);
                day.low = day.low.min(entry.temp_min);
                day.precipitation_chance = day.precipitation_chance.max(entry.precipitation_chance);
            }
            _ => {
                if days.len() == FORECAST_DAYS {
                    break;
                }
                days.push(DayForecast {
                    date: entry.local_date,
                    high: entry.temp_max,
                    low: entry.temp_min,
                    condition: entry.condition,
                    precipitation_chance: entry.precipitation_chance,
                });
            }
        }
    }

    days
}
