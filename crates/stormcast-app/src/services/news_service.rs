//! News backend: page fetches run on the runtime; results sent via mpsc.

use std::sync::mpsc;
use std::sync::Arc;

use stormcast_core::FetchError;
use stormcast_news::{Article, ArticleFetcher, FetchTicket};
use tokio::runtime::Handle;

/// Messages sent from async operations back to the model
#[derive(Debug)]
pub enum NewsServiceMessage {
    /// Result of fetching the page reserved by `ticket`
    PageDone {
        ticket: FetchTicket,
        result: Result<Vec<Article>, FetchError>,
    },
}

/// Fetch the page described by `ticket` without blocking the caller.
/// Sends `PageDone` on the channel when complete.
pub fn request_page(
    tx: &mpsc::Sender<NewsServiceMessage>,
    runtime: &Handle,
    fetcher: Arc<dyn ArticleFetcher>,
    ticket: FetchTicket,
) {
    let tx = tx.clone();

    runtime.spawn(async move {
        let result = fetcher
            .fetch_articles(ticket.category(), ticket.page())
            .await;

        if tx.send(NewsServiceMessage::PageDone { ticket, result }).is_err() {
            tracing::debug!(
                "News model gone before {} page {} arrived",
                ticket.category(),
                ticket.page()
            );
        }
    });
}
