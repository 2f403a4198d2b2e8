//! Integration tests for NewsClient using wiremock.

use stormcast_core::{FetchError, HttpConfig, NewsConfig, RetryConfig};
use stormcast_news::{ArticleFetcher, NewsCategory, NewsClient};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NewsClient {
    let config = NewsConfig {
        api_key: "news-key".to_string(),
        base_url: format!("{}/api/v1/article/getArticles", server.uri()),
        ..NewsConfig::default()
    };
    NewsClient::new(config, &HttpConfig::default())
        .unwrap()
        .with_retry_config(RetryConfig::none())
}

fn article_json(uri: &str, sentiment: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "uri": uri,
        "url": format!("https://example.in/{}", uri),
        "title": format!("Headline {}", uri),
        "body": "Body text",
        "lang": "eng",
        "source": { "uri": "example.in", "title": "Example Times" },
        "authors": [],
        "image": null,
        "dateTimePub": "2026-03-01T06:30:00Z",
        "sentiment": sentiment
    })
}

fn page_body(articles: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "articles": {
            "results": articles,
            "totalResults": 120,
            "page": 1,
            "count": 20,
            "pages": 6
        }
    })
}

#[tokio::test]
async fn test_category_keyword_and_paging_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/article/getArticles"))
        .and(body_partial_json(serde_json::json!({
            "action": "getArticles",
            "keyword": "Tech",
            "articlesPage": 3,
            "articlesCount": 20,
            "articlesSortBy": "date",
            "lang": "eng",
            "apiKey": "news-key"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![
            article_json("a1", serde_json::json!(0.4)),
            article_json("a2", serde_json::json!(-0.7)),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.fetch_articles(NewsCategory::Tech, 3).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].id, "a1");
    assert_eq!(articles[0].source, "Example Times");
    assert_eq!(articles[1].sentiment, -0.7);
}

#[tokio::test]
async fn test_all_category_omits_keyword() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/article/getArticles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.get_articles(NewsCategory::All, 1).await.unwrap();
    assert!(articles.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("keyword").is_none());
    assert_eq!(body["articlesPage"], 1);
}

#[tokio::test]
async fn test_null_sentiment_becomes_neutral() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![article_json(
            "n1",
            serde_json::Value::Null,
        )])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.get_articles(NewsCategory::World, 1).await.unwrap();
    assert_eq!(articles[0].sentiment, 0.0);
}

#[tokio::test]
async fn test_missing_articles_field_is_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let articles = client.get_articles(NewsCategory::Sport, 9).await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn test_api_error_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Invalid API key" })),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_articles(NewsCategory::Tech, 1).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(ref m) if m.contains("Invalid API key")));
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_articles(NewsCategory::Tech, 1).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            status: 403,
            message: "forbidden".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.get_articles(NewsCategory::Tech, 1).await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_server_error_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(vec![article_json(
            "r1",
            serde_json::json!(0.5),
        )])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).with_retry_config(RetryConfig::new(2, 1, 10));
    let articles = client.get_articles(NewsCategory::Tech, 1).await.unwrap();
    assert_eq!(articles.len(), 1);
}
