use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as shown in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier (EventRegistry article uri)
    pub id: String,
    pub url: String,
    pub title: String,
    pub body: String,
    /// Publisher name
    pub source: String,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub lang: String,
    pub authors: Vec<String>,
    /// Tone of the article, -1.0 (negative) to 1.0 (positive)
    pub sentiment: f64,
}

/// Article as returned by the EventRegistry API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiArticle {
    pub uri: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub lang: String,
    pub source: Option<ApiSource>,
    #[serde(default)]
    pub authors: Vec<ApiAuthor>,
    pub image: Option<String>,
    pub date_time_pub: Option<String>,
    pub date_time: Option<String>,
    /// Null when the service could not score the article
    pub sentiment: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSource {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiAuthor {
    Name(String),
    Detailed { name: String },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiArticlePage {
    #[serde(default)]
    pub results: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub articles: Option<ApiArticlePage>,
    pub error: Option<String>,
}

impl Article {
    pub(crate) fn from_api(api: ApiArticle) -> Self {
        let published_at = api
            .date_time_pub
            .as_deref()
            .or(api.date_time.as_deref())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Self {
            id: api.uri,
            url: api.url,
            title: api.title,
            body: api.body,
            source: api.source.map(|s| s.title).unwrap_or_default(),
            image: api.image.filter(|i| !i.is_empty()),
            published_at,
            lang: api.lang,
            authors: api
                .authors
                .into_iter()
                .map(|a| match a {
                    ApiAuthor::Name(name) | ApiAuthor::Detailed { name } => name,
                })
                .collect(),
            sentiment: api.sentiment.unwrap_or(0.0),
        }
    }
}
