//! NewsModel driven end to end through the service channel.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use stormcast_app::NewsModel;
use stormcast_core::FetchError;
use stormcast_news::{Article, ArticleFetcher, NewsCategory};
use stormcast_weather::MoodCategory;
use tokio::sync::Notify;

const WAIT: Duration = Duration::from_secs(5);

/// Scripted responses; fetches for `gated` wait until `release` is called.
#[derive(Default)]
struct GatedFetcher {
    responses: Mutex<HashMap<(NewsCategory, u32), VecDeque<Result<Vec<Article>, FetchError>>>>,
    gated: Option<NewsCategory>,
    gate: Notify,
}

impl GatedFetcher {
    fn gated(category: NewsCategory) -> Self {
        Self {
            gated: Some(category),
            ..Self::default()
        }
    }

    fn respond(&self, category: NewsCategory, page: u32, result: Result<Vec<Article>, FetchError>) {
        self.responses
            .lock()
            .entry((category, page))
            .or_default()
            .push_back(result);
    }

    fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl ArticleFetcher for GatedFetcher {
    async fn fetch_articles(
        &self,
        category: NewsCategory,
        page: u32,
    ) -> Result<Vec<Article>, FetchError> {
        if self.gated == Some(category) {
            self.gate.notified().await;
        }
        self.responses
            .lock()
            .get_mut(&(category, page))
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn article(id: &str, sentiment: f64) -> Article {
    Article {
        id: id.to_string(),
        url: format!("https://news.example/{}", id),
        title: id.to_string(),
        body: String::new(),
        source: "Example".to_string(),
        image: None,
        published_at: None,
        lang: "eng".to_string(),
        authors: Vec::new(),
        sentiment,
    }
}

fn visible_ids(model: &NewsModel) -> Vec<String> {
    model.filtered_view().iter().map(|a| a.id.clone()).collect()
}

#[test]
fn test_category_switch_discards_late_page() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fetcher = Arc::new(GatedFetcher::gated(NewsCategory::Tech));
    fetcher.respond(NewsCategory::Tech, 1, Ok(vec![article("tech-1", 0.9)]));
    fetcher.respond(NewsCategory::Sport, 1, Ok(vec![article("sport-1", 0.9)]));

    let mut model = NewsModel::new(fetcher.clone(), runtime.handle().clone(), MoodCategory::Cool);
    model.select_category(NewsCategory::Tech);
    model.select_category(NewsCategory::Sport);

    assert!(model.wait_for_update(WAIT));
    assert_eq!(visible_ids(&model), vec!["sport-1"]);

    fetcher.release();
    assert!(!model.wait_for_update(Duration::from_millis(300)));
    assert_eq!(visible_ids(&model), vec!["sport-1"]);
    assert_eq!(model.category(), NewsCategory::Sport);
}

#[test]
fn test_failed_page_can_be_retried() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fetcher = Arc::new(GatedFetcher::default());
    fetcher.respond(NewsCategory::World, 1, Ok(vec![article("w1", 0.5)]));
    fetcher.respond(NewsCategory::World, 2, Err(FetchError::Timeout));
    fetcher.respond(NewsCategory::World, 2, Ok(vec![article("w2", 0.6)]));

    let mut model = NewsModel::new(fetcher, runtime.handle().clone(), MoodCategory::Cool);
    model.select_category(NewsCategory::World);
    assert!(model.wait_for_update(WAIT));

    assert!(model.load_more());
    assert!(model.wait_for_update(WAIT));
    assert_eq!(model.error_message(), Some(FetchError::Timeout.user_message()));
    assert_eq!(visible_ids(&model), vec!["w1"]);
    assert!(model.has_more());

    assert!(model.retry());
    assert!(model.wait_for_update(WAIT));
    assert_eq!(model.error_message(), None);
    assert_eq!(visible_ids(&model), vec!["w1", "w2"]);
}

#[test]
fn test_exhausted_feed_stops_requesting() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fetcher = Arc::new(GatedFetcher::default());
    fetcher.respond(NewsCategory::Games, 1, Ok(vec![article("g1", 0.4)]));

    let mut model = NewsModel::new(fetcher, runtime.handle().clone(), MoodCategory::Cool);
    model.select_category(NewsCategory::Games);
    assert!(model.wait_for_update(WAIT));

    // page 2 is unscripted and comes back empty
    assert!(model.load_more());
    assert!(model.wait_for_update(WAIT));
    assert!(!model.has_more());

    assert!(!model.load_more());
    assert!(!model.is_loading_more());
    assert_eq!(model.article_count(), 1);
}

#[test]
fn test_mood_change_refilters_loaded_articles() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let fetcher = Arc::new(GatedFetcher::default());
    fetcher.respond(
        NewsCategory::All,
        1,
        Ok(vec![article("calm", 0.6), article("grim", -0.7), article("sour", -0.3)]),
    );

    let mut model = NewsModel::new(fetcher, runtime.handle().clone(), MoodCategory::Cool);
    model.select_category(NewsCategory::All);
    assert!(model.wait_for_update(WAIT));
    assert_eq!(visible_ids(&model), vec!["calm"]);

    model.set_mood(MoodCategory::Cold);
    assert_eq!(visible_ids(&model), vec!["grim", "sour"]);

    model.set_mood(MoodCategory::Hot);
    assert_eq!(visible_ids(&model), vec!["grim"]);
    assert_eq!(model.article_count(), 3);
}
