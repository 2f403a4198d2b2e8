pub mod news_model;
pub mod weather_model;

pub use news_model::NewsModel;
pub use weather_model::WeatherModel;
