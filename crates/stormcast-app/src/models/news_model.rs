//! View model for the news feed.
//!
//! Page fetches run on the tokio runtime through
//! [`news_service::request_page`]; results come back over an mpsc channel and
//! are applied when the owner calls [`NewsModel::poll_channel`] or
//! [`NewsModel::wait_for_update`].

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use stormcast_core::TemperatureUnit;
use stormcast_news::{
    Article, ArticleFetcher, FeedAccumulator, FeedStatus, NewsCategory, PageOutcome,
};
use stormcast_weather::{classify_reading, MoodCategory};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::models::WeatherModel;
use crate::services::news_service::{self, NewsServiceMessage};

pub struct NewsModel {
    feed: FeedAccumulator,
    fetcher: Arc<dyn ArticleFetcher>,
    runtime: Handle,
    tx: mpsc::Sender<NewsServiceMessage>,
    rx: mpsc::Receiver<NewsServiceMessage>,
    error_message: Option<String>,
    /// Page and replace flag of the last failed fetch
    failed: Option<(u32, bool)>,
}

impl NewsModel {
    pub fn new(fetcher: Arc<dyn ArticleFetcher>, runtime: Handle, mood: MoodCategory) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            feed: FeedAccumulator::new(NewsCategory::default(), mood),
            fetcher,
            runtime,
            tx,
            rx,
            error_message: None,
            failed: None,
        }
    }

    /// Show `category`, starting again from its first page.
    pub fn select_category(&mut self, category: NewsCategory) {
        self.feed.reset(category);
        self.failed = None;
        self.request(1, true);
    }

    /// Request the next page. Returns false when nothing was requested.
    pub fn load_more(&mut self) -> bool {
        let next = self.feed.current_page() + 1;
        self.request(next, false)
    }

    /// Request the page that last failed again.
    pub fn retry(&mut self) -> bool {
        match self.failed {
            Some((page, replace)) => self.request(page, replace),
            None => false,
        }
    }

    pub fn set_mood(&mut self, mood: MoodCategory) {
        self.feed.set_mood(mood);
    }

    /// Derive the mood from a temperature reading in `unit`.
    pub fn apply_temperature(&mut self, value: f64, unit: TemperatureUnit) -> MoodCategory {
        let mood = classify_reading(value, unit);
        self.set_mood(mood);
        mood
    }

    /// Follow the weather: take its newest reading, if any, as the mood.
    pub fn apply_weather(&mut self, weather: &mut WeatherModel) -> Option<MoodCategory> {
        let (value, unit) = weather.take_new_reading()?;
        Some(self.apply_temperature(value, unit))
    }

    /// Apply every result that has arrived. Returns true if the feed changed.
    pub fn poll_channel(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.handle_message(msg);
        }
        changed
    }

    /// Block until a result changes the feed or `timeout` elapses.
    ///
    /// Must not be called from inside the runtime the fetches run on.
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

    fn request(&mut self, page: u32, replace: bool) -> bool {
        let Some(ticket) = self.feed.begin_fetch(page, replace) else {
            return false;
        };

        self.error_message = None;
        news_service::request_page(&self.tx, &self.runtime, self.fetcher.clone(), ticket);
        true
    }

    fn handle_message(&mut self, msg: NewsServiceMessage) -> bool {
        match msg {
            NewsServiceMessage::PageDone { ticket, result } => {
                match self.feed.complete_fetch(ticket, result) {
                    Ok(PageOutcome::Stale) | Ok(PageOutcome::Skipped) => false,
                    Ok(_) => {
                        self.failed = None;
                        self.error_message = None;
                        true
                    }
                    Err(e) => {
                        self.failed = Some((ticket.page(), ticket.replace()));
                        self.error_message = Some(e.user_message().to_string());
                        true
                    }
                }
            }
        }
    }

    pub fn filtered_view(&self) -> Vec<&Article> {
        self.feed.filtered_view()
    }

    pub fn article_count(&self) -> usize {
        self.feed.all_articles().len()
    }

    pub fn category(&self) -> NewsCategory {
        self.feed.category()
    }

    pub fn mood(&self) -> MoodCategory {
        self.feed.mood()
    }

    pub fn banner(&self) -> &'static str {
        self.feed.mood().banner()
    }

    /// First page of the current category is loading.
    pub fn is_loading(&self) -> bool {
        self.feed.in_flight().is_some_and(|t| t.replace())
    }

    /// A further page is loading below the current list.
    pub fn is_loading_more(&self) -> bool {
        self.feed.in_flight().is_some_and(|t| !t.replace())
    }

    pub fn has_more(&self) -> bool {
        self.feed.has_more()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.feed.subscribe()
    }
}
