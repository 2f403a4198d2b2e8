//! News feed for StormCast
//!
//! Category-filtered article search against EventRegistry and the
//! accumulator that pages, de-duplicates and mood-filters the results.

pub mod category;
pub mod client;
pub mod feed;
pub mod types;

pub use category::{NewsCategory, UnknownCategory};
pub use client::{ArticleFetcher, NewsClient};
pub use feed::{mood_filter, FeedAccumulator, FeedStatus, FetchTicket, PageOutcome};
pub use types::Article;
