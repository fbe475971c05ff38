//! NewsAPI client for market headlines.

use super::{BoxFuture, NewsSource};
use crate::error::{AppError, Result};
use crate::types::{NewsArticle, NewsCategory};
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";
const PAGE_SIZE: &str = "5";
const DESCRIPTION_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    source: NewsApiSource,
    url: Option<String>,
    published_at: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

/// Clip a description to a fixed number of characters.
fn clip_description(description: Option<String>) -> String {
    match description {
        Some(d) if !d.is_empty() => {
            let clipped: String = d.chars().take(DESCRIPTION_CHARS).collect();
            format!("{}...", clipped)
        }
        _ => String::new(),
    }
}

fn into_articles(response: NewsApiResponse, category: NewsCategory) -> Vec<NewsArticle> {
    response
        .articles
        .into_iter()
        .filter_map(|a| {
            Some(NewsArticle {
                title: a.title.filter(|t| !t.is_empty())?,
                source: a.source.name.unwrap_or_else(|| "Unknown".to_string()),
                url: a.url?,
                published_at: a.published_at.unwrap_or_default(),
                description: clip_description(a.description),
                category,
            })
        })
        .filter(NewsArticle::is_market_story)
        .collect()
}

pub struct NewsApiClient {
    client: Client,
    url: String,
    api_key: String,
    /// How far back to search.
    window_days: i64,
}

impl NewsApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: EVERYTHING_URL.to_string(),
            api_key: api_key.into(),
            window_days: 2,
        })
    }

    /// Query another `/v2/everything` endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub async fn search(&self, category: NewsCategory) -> Result<Vec<NewsArticle>> {
        let from = (Utc::now() - ChronoDuration::days(self.window_days))
            .format("%Y-%m-%d")
            .to_string();

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("q", category.query()),
                ("sortBy", "publishedAt"),
                ("language", "en"),
                ("pageSize", PAGE_SIZE),
                ("from", from.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "News API error for {}: {}",
                category.name(),
                response.status()
            )));
        }

        let data: NewsApiResponse = response.json().await?;
        let articles = into_articles(data, category);
        debug!("{} market stories for {}", articles.len(), category.name());
        Ok(articles)
    }
}

impl NewsSource for NewsApiClient {
    fn fetch_category(&self, category: NewsCategory) -> BoxFuture<'_, Vec<NewsArticle>> {
        Box::pin(self.search(category))
    }
}
