pub mod news_service;
pub mod weather_service;

pub use news_service::{request_page as request_news_page, NewsServiceMessage};
pub use weather_service::{request_fetch as request_weather_fetch, WeatherServiceMessage};
