//! Paginated, de-duplicated, mood-filtered news feed.
//!
//! A [`FeedAccumulator`] holds the articles of one category session. Pages are
//! fetched in two phases: [`FeedAccumulator::begin_fetch`] hands out a
//! [`FetchTicket`] (or refuses while exhausted or busy) and
//! [`FeedAccumulator::complete_fetch`] applies the response. The ticket records
//! the session generation it was issued for, so a response that arrives after
//! the category changed is dropped instead of being merged into the new
//! session.
//!
//! Observers subscribe to a [`FeedStatus`] watch channel that is updated on
//! every state change.

use std::collections::HashSet;

use stormcast_core::FetchError;
use stormcast_weather::MoodCategory;
use tokio::sync::watch;

use crate::category::NewsCategory;
use crate::client::ArticleFetcher;
use crate::types::Article;

/// Whether `article` belongs in the feed under `mood`.
pub fn mood_filter(mood: MoodCategory, article: &Article) -> bool {
    mood.keeps(article.sentiment)
}

/// Permission to fetch one page, issued by [`FeedAccumulator::begin_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    category: NewsCategory,
    page: u32,
    replace: bool,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn category(&self) -> NewsCategory {
        self.category
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn replace(&self) -> bool {
        self.replace
    }
}

/// What a page fetch did to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Non-empty page merged into the feed.
    Loaded {
        page: u32,
        added: usize,
        duplicates: usize,
    },
    /// Empty page: pagination is over.
    Exhausted,
    /// Response belonged to an earlier session and was discarded.
    Stale,
    /// Fetch refused because the feed is exhausted or already loading.
    Skipped,
}

/// Snapshot published to observers after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedStatus {
    pub category: NewsCategory,
    pub generation: u64,
    pub current_page: u32,
    pub has_more: bool,
    /// Page currently being fetched, if any
    pub loading_page: Option<u32>,
    pub total: usize,
    pub visible: usize,
    pub mood: MoodCategory,
    pub last_error: Option<FetchError>,
}

pub struct FeedAccumulator {
    category: NewsCategory,
    generation: u64,
    articles: Vec<Article>,
    seen: HashSet<String>,
    current_page: u32,
    has_more: bool,
    in_flight: Option<FetchTicket>,
    mood: MoodCategory,
    last_error: Option<FetchError>,
    status_tx: watch::Sender<FeedStatus>,
}

impl FeedAccumulator {
    /// Start an empty session for `category`. No page is fetched yet.
    pub fn new(category: NewsCategory, mood: MoodCategory) -> Self {
        let (status_tx, _) = watch::channel(FeedStatus {
            category,
            generation: 1,
            current_page: 0,
            has_more: true,
            loading_page: None,
            total: 0,
            visible: 0,
            mood,
            last_error: None,
        });

        Self {
            category,
            generation: 1,
            articles: Vec::new(),
            seen: HashSet::new(),
            current_page: 0,
            has_more: true,
            in_flight: None,
            mood,
            last_error: None,
            status_tx,
        }
    }

    /// Receive a [`FeedStatus`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.status_tx.subscribe()
    }

    /// Drop the current session and start a new one for `category`.
    ///
    /// Any fetch still in flight becomes stale. The caller is expected to
    /// follow up with `begin_fetch(1, true)`.
    pub fn reset(&mut self, category: NewsCategory) {
        if let Some(ticket) = self.in_flight.take() {
            tracing::debug!(
                "Abandoning in-flight fetch of {} page {}",
                ticket.category,
                ticket.page
            );
        }

        self.category = category;
        self.generation += 1;
        self.articles.clear();
        self.seen.clear();
        self.current_page = 0;
        self.has_more = true;
        self.last_error = None;

        tracing::info!("Feed reset to {} (session {})", category, self.generation);
        self.notify();
    }

    /// Reserve the fetch of `page` for the active category.
    ///
    /// Returns `None` (and changes nothing) when the feed is exhausted or a
    /// fetch is already in flight.
    pub fn begin_fetch(&mut self, page: u32, replace: bool) -> Option<FetchTicket> {
        if !self.has_more {
            tracing::debug!("Fetch of page {} skipped: feed exhausted", page);
            return None;
        }
        if let Some(pending) = self.in_flight {
            tracing::debug!(
                "Fetch of page {} skipped: page {} still loading",
                page,
                pending.page
            );
            return None;
        }

        let ticket = FetchTicket {
            generation: self.generation,
            category: self.category,
            page,
            replace,
        };
        self.in_flight = Some(ticket);
        self.notify();
        Some(ticket)
    }

    /// Reserve the fetch of the page after the last loaded one.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        self.begin_fetch(self.current_page + 1, false)
    }

    /// Apply the response for `ticket`.
    ///
    /// Errors leave articles, page and `has_more` untouched so the same page
    /// can be requested again.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Article>, FetchError>,
    ) -> Result<PageOutcome, FetchError> {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            tracing::warn!(
                "Discarding stale response for {} page {} (session {}, active {})",
                ticket.category,
                ticket.page,
                ticket.generation,
                self.generation
            );
            return Ok(PageOutcome::Stale);
        }
        self.in_flight = None;

        let fetched = match result {
            Ok(articles) => articles,
            Err(e) => {
                tracing::warn!("Fetch of {} page {} failed: {}", ticket.category, ticket.page, e);
                self.last_error = Some(e.clone());
                self.notify();
                return Err(e);
            }
        };
        self.last_error = None;

        if fetched.is_empty() {
            tracing::info!("{} feed exhausted at page {}", ticket.category, ticket.page);
            self.has_more = false;
            self.notify();
            return Ok(PageOutcome::Exhausted);
        }

        if ticket.replace {
            self.articles.clear();
            self.seen.clear();
        }

        let received = fetched.len();
        let added = self.append(fetched);
        self.current_page = ticket.page;

        if added < received {
            tracing::debug!(
                "Skipped {} duplicate articles on page {}",
                received - added,
                ticket.page
            );
        }

        self.notify();
        Ok(PageOutcome::Loaded {
            page: ticket.page,
            added,
            duplicates: received - added,
        })
    }

    /// Fetch `page` from `fetcher` and apply it.
    pub async fn fetch_page<F>(
        &mut self,
        fetcher: &F,
        page: u32,
        replace: bool,
    ) -> Result<PageOutcome, FetchError>
    where
        F: ArticleFetcher + ?Sized,
    {
        let Some(ticket) = self.begin_fetch(page, replace) else {
            return Ok(PageOutcome::Skipped);
        };
        let result = fetcher.fetch_articles(ticket.category, ticket.page).await;
        self.complete_fetch(ticket, result)
    }

    /// Fetch the next page, unless exhausted or already loading.
    pub async fn load_more<F>(&mut self, fetcher: &F) -> Result<PageOutcome, FetchError>
    where
        F: ArticleFetcher + ?Sized,
    {
        let next = self.current_page + 1;
        self.fetch_page(fetcher, next, false).await
    }

    /// Switch to `category` and load its first page.
    pub async fn reset_and_load<F>(
        &mut self,
        fetcher: &F,
        category: NewsCategory,
    ) -> Result<PageOutcome, FetchError>
    where
        F: ArticleFetcher + ?Sized,
    {
        self.reset(category);
        self.fetch_page(fetcher, 1, true).await
    }

    pub fn set_mood(&mut self, mood: MoodCategory) {
        if self.mood != mood {
            tracing::info!("Feed mood changed from {} to {}", self.mood, mood);
        }
        self.mood = mood;
        self.notify();
    }

    /// Articles that suit the current mood, in fetch order.
    pub fn filtered_view(&self) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| mood_filter(self.mood, a))
            .collect()
    }

    pub fn all_articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn category(&self) -> NewsCategory {
        self.category
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn mood(&self) -> MoodCategory {
        self.mood
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn status(&self) -> FeedStatus {
        FeedStatus {
            category: self.category,
            generation: self.generation,
            current_page: self.current_page,
            has_more: self.has_more,
            loading_page: self.in_flight.map(|t| t.page),
            total: self.articles.len(),
            visible: self.articles.iter().filter(|a| mood_filter(self.mood, a)).count(),
            mood: self.mood,
            last_error: self.last_error.clone(),
        }
    }

    /// Append articles whose id has not been seen this session.
    fn append(&mut self, fetched: Vec<Article>) -> usize {
        let before = self.articles.len();
        for article in fetched {
            if self.seen.insert(article.id.clone()) {
                self.articles.push(article);
            }
        }
        self.articles.len() - before
    }

    fn notify(&self) {
        self.status_tx.send_replace(self.status());
    }
}
