//! EventRegistry article search client.

use async_trait::async_trait;
use serde::Serialize;
use stormcast_core::{with_retry, FetchError, HttpConfig, NewsConfig, RetryConfig};
use tracing::instrument;

use crate::category::NewsCategory;
use crate::types::{ApiResponse, Article};

/// Source of pages of articles for a category.
///
/// Pages are 1-based and ordered newest first. An empty page means there is
/// nothing more to load.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_articles(
        &self,
        category: NewsCategory,
        page: u32,
    ) -> Result<Vec<Article>, FetchError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleSearchRequest<'a> {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<&'a str>,
    source_location_uri: [&'a str; 1],
    lang: &'static str,
    articles_page: u32,
    articles_count: u32,
    articles_sort_by: &'static str,
    articles_sort_by_asc: bool,
    data_type: [&'static str; 1],
    force_max_data_time_window: u32,
    result_type: &'static str,
    api_key: &'a str,
}

pub struct NewsClient {
    client: reqwest::Client,
    config: NewsConfig,
    retry: RetryConfig,
}

impl NewsClient {
    pub fn new(config: NewsConfig, http: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(http.timeout()).build()?;

        Ok(Self {
            client,
            config,
            retry: http.retry_config(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch one page of articles, newest first.
    #[instrument(skip(self), level = "info")]
    pub async fn get_articles(
        &self,
        category: NewsCategory,
        page: u32,
    ) -> Result<Vec<Article>, FetchError> {
        if self.config.api_key.is_empty() {
            return Err(FetchError::Status {
                status: 401,
                message: "news API key is not configured".to_string(),
            });
        }

        let request = ArticleSearchRequest {
            action: "getArticles",
            keyword: category.keyword(),
            source_location_uri: [self.config.source_location_uri.as_str()],
            lang: "eng",
            articles_page: page,
            articles_count: self.config.page_size,
            articles_sort_by: "date",
            articles_sort_by_asc: false,
            data_type: ["news"],
            force_max_data_time_window: self.config.max_days_back,
            result_type: "articles",
            api_key: &self.config.api_key,
        };

        let client = &self.client;
        let url = self.config.base_url.as_str();
        let request = &request;
        let text = with_retry(&self.retry, || async move {
            let response = client
                .post(url)
                .header("Accept", "application/json")
                .json(request)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    message: text,
                });
            }
            Ok(text)
        })
        .await?;

        let body: ApiResponse = serde_json::from_str(&text)?;
        if let Some(error) = body.error {
            return Err(FetchError::InvalidResponse(format!("news API error: {}", error)));
        }

        let articles: Vec<Article> = body
            .articles
            .map(|page| page.results)
            .unwrap_or_default()
            .into_iter()
            .map(Article::from_api)
            .collect();

        tracing::info!("Fetched {} articles for {} page {}", articles.len(), category, page);
        Ok(articles)
    }
}

#[async_trait]
impl ArticleFetcher for NewsClient {
    async fn fetch_articles(
        &self,
        category: NewsCategory,
        page: u32,
    ) -> Result<Vec<Article>, FetchError> {
        self.get_articles(category, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = ArticleSearchRequest {
            action: "getArticles",
            keyword: NewsCategory::All.keyword(),
            source_location_uri: ["http://en.wikipedia.org/wiki/India"],
            lang: "eng",
            articles_page: 2,
            articles_count: 20,
            articles_sort_by: "date",
            articles_sort_by_asc: false,
            data_type: ["news"],
            force_max_data_time_window: 31,
            result_type: "articles",
            api_key: "k",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("keyword").is_none());
        assert_eq!(json["articlesPage"], 2);
        assert_eq!(json["articlesCount"], 20);
        assert_eq!(json["articlesSortByAsc"], false);
        assert_eq!(json["sourceLocationUri"][0], "http://en.wikipedia.org/wiki/India");
        assert_eq!(json["forceMaxDataTimeWindow"], 31);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let client = NewsClient::new(NewsConfig::default(), &HttpConfig::default()).unwrap();
        let err = client.get_articles(NewsCategory::Tech, 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
        assert!(!err.is_transient());
    }
}
