//! News search provider client.
//!
//! Wraps a NewsAPI-style `/everything` endpoint: paginated keyword search
//! with a lookback window, auth via the `X-Api-Key` header. Provider rows
//! without a URL are dropped at the edge so the rest of the pipeline can
//! rely on `Article::url` as an identity.

use crate::models::Article;
use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use tracing::{info, instrument};

/// Trait for one page of provider results.
///
/// The scout drives pagination through this seam; tests substitute scripted
/// page sequences.
pub trait NewsProvider {
    /// Fetch one page of articles for `topic`, searching back to `from`.
    /// Page numbers start at 1.
    async fn page(
        &self,
        topic: &str,
        from: NaiveDate,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Article>, Box<dyn Error>>;
}

/// reqwest-backed client for the news search API.
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // api_key deliberately omitted
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: RawSource,
}

#[derive(Default, Deserialize)]
struct RawSource {
    #[serde(default)]
    name: Option<String>,
}

impl NewsProvider for NewsApiClient {
    #[instrument(level = "info", skip(self))]
    async fn page(
        &self,
        topic: &str,
        from: NaiveDate,
        page_size: u32,
        page: u32,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        let from_s = from.to_string();
        let page_size_s = page_size.to_string();
        let page_s = page.to_string();

        let response = self
            .http
            .get(format!("{}/everything", self.base_url))
            .query(&[
                ("q", topic),
                ("from", from_s.as_str()),
                ("pageSize", page_size_s.as_str()),
                ("sortBy", "relevancy"),
                ("language", "en"),
                ("page", page_s.as_str()),
            ])
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?
            .error_for_status()?;
        let body: SearchResponse = response.json().await?;
        let articles = into_articles(body);

        info!(page, count = articles.len(), "Fetched provider page");
        Ok(articles)
    }
}

fn into_articles(body: SearchResponse) -> Vec<Article> {
    body.articles
        .into_iter()
        .filter_map(|raw| {
            let url = raw.url.filter(|u| !u.is_empty())?;
            Some(Article {
                title: raw.title.unwrap_or_default(),
                url,
                source: raw.source.name.unwrap_or_default(),
                description: raw.description.unwrap_or_default(),
            })
        })
        .collect()
}
