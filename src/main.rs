use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use stormcast_app::{NewsModel, Preferences, WeatherModel};
use stormcast_news::{NewsCategory, NewsClient};
use stormcast_weather::WeatherProvider;

const FETCH_WAIT: Duration = Duration::from_secs(30);
const WATCH_FLAG: &str = "--watch";

fn main() -> Result<()> {
    // Initialize core
    stormcast_core::init()?;

    let mut app = match stormcast_core::App::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };
    app.initialize()?;
    let config = app.shared_config();
    tracing::info!("StormCast started");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let watch = args.iter().any(|arg| arg == WATCH_FLAG);

    let runtime = tokio::runtime::Runtime::new()?;
    let preferences = Arc::new(Mutex::new(Preferences::load(
        app.settings(),
        config.weather.temperature_unit,
    )));

    // Weather first: its temperature decides which news is shown
    let provider = WeatherProvider::new(&config.weather, &config.http)?;
    let mut weather = WeatherModel::new(
        provider,
        preferences.clone(),
        runtime.handle().clone(),
        config.weather.latitude,
        config.weather.longitude,
    );
    weather.refresh();
    weather.wait_for_update(FETCH_WAIT);

    println!("StormCast");
    match weather.current() {
        Some(current) => {
            let symbol = weather.unit().symbol();
            println!(
                "\n{}, {}: {:.0}{} {} (feels like {:.0}{})",
                current.city,
                current.country,
                current.temperature,
                symbol,
                current.description,
                current.feels_like,
                symbol
            );
            println!(
                "  Humidity {}%  Wind {:.1}  Rain {:.1} mm",
                current.humidity, current.wind_speed, current.rain_1h
            );
            for day in weather.forecast() {
                println!(
                    "  {}  {:>4.0}{} / {:>4.0}{}  {:<14} {:>3}%",
                    day.date.format("%a %d %b"),
                    day.high,
                    symbol,
                    day.low,
                    symbol,
                    day.condition.description(),
                    day.precipitation_chance
                );
            }
        }
        None => {
            let message = weather.error_message().unwrap_or("Weather unavailable");
            println!("\n{}", message);
        }
    }

    let mood = weather.mood().unwrap_or_default();
    let category = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .map(|arg| arg.parse::<NewsCategory>())
        .transpose()?
        .unwrap_or_else(|| {
            preferences
                .lock()
                .enabled_categories()
                .first()
                .copied()
                .unwrap_or_default()
        });

    let client = NewsClient::new(config.news.clone(), &config.http)?;
    let mut news = NewsModel::new(Arc::new(client), runtime.handle().clone(), mood);
    // the first reading already set the mood
    weather.take_new_reading();
    news.select_category(category);
    news.wait_for_update(FETCH_WAIT);
    print_headlines(&news);

    if watch {
        weather.start_auto_refresh(config.weather.refresh_minutes);
        loop {
            if !weather.wait_for_update(FETCH_WAIT) {
                continue;
            }
            if let Some(mood) = news.apply_weather(&mut weather) {
                if let Some(current) = weather.current() {
                    println!(
                        "\n{}: {:.0}{}",
                        current.city,
                        current.temperature,
                        weather.unit().symbol()
                    );
                }
                tracing::info!("Mood is now {}", mood);
                news.poll_channel();
                print_headlines(&news);
            }
        }
    }

    app.shutdown()?;
    Ok(())
}

fn print_headlines(news: &NewsModel) {
    println!("\n[{}] {}", news.mood(), news.banner());
    println!("{} news", news.category());
    if let Some(message) = news.error_message() {
        println!("  {}", message);
    }
    let headlines = news.filtered_view();
    if headlines.is_empty() && news.error_message().is_none() {
        println!("  Nothing matches the current mood.");
    }
    for article in headlines {
        println!("  - {} ({})", article.title, article.source);
    }
}
