//! Article discovery: cache-first topic search with per-candidate gating.
//!
//! The scout pages through the news provider until enough gate-approved
//! articles are collected or the page budget runs out. A page-level network
//! error stops pagination but keeps whatever was already collected; only a
//! completely empty harvest is terminal.

use crate::cache::CacheStore;
use crate::gatekeeper::Gatekeeper;
use crate::llm::ChatClient;
use crate::models::Article;
use crate::news::NewsProvider;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use tracing::{info, instrument, warn};

/// How far back the provider search window reaches.
pub const LOOKBACK_DAYS: i64 = 7;
/// Upper bound on provider pages per run.
pub const MAX_PAGES: u32 = 3;

/// Terminal scouting failure: every page was exhausted without a single
/// gate-approved article.
#[derive(Debug)]
pub struct NoArticlesError {
    pub topic: String,
}

impl fmt::Display for NoArticlesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no relevant articles found for topic {:?}", self.topic)
    }
}

impl Error for NoArticlesError {}

/// Paged article discovery over a [`NewsProvider`], gated per candidate.
pub struct Scout<'a, P, C> {
    provider: &'a P,
    gatekeeper: &'a Gatekeeper<C>,
    cache: &'a CacheStore,
    page_size: u32,
}

impl<'a, P: NewsProvider, C: ChatClient> Scout<'a, P, C> {
    pub fn new(
        provider: &'a P,
        gatekeeper: &'a Gatekeeper<C>,
        cache: &'a CacheStore,
        page_size: u32,
    ) -> Self {
        Self {
            provider,
            gatekeeper,
            cache,
            page_size,
        }
    }

    /// Collect up to `desired_count` relevant articles for `topic`.
    ///
    /// A fresh, sufficiently large cache entry is used verbatim without any
    /// network traffic. Otherwise pages are fetched from a
    /// [`LOOKBACK_DAYS`]-day window, candidates de-duplicated by URL, and
    /// each new candidate put to the gatekeeper; pagination stops at
    /// `desired_count` accepted, an empty page, a page error, or
    /// [`MAX_PAGES`].
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(
        &self,
        topic: &str,
        desired_count: usize,
    ) -> Result<Vec<Article>, Box<dyn Error>> {
        if let Some(cached) = self.cache.load_article_list(topic, desired_count).await {
            info!(topic, count = cached.len(), "Using cached article list");
            return Ok(cached.into_iter().take(desired_count).collect());
        }

        let from = (Utc::now() - Duration::days(LOOKBACK_DAYS)).date_naive();
        let mut accepted: Vec<Article> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        'pages: for page in 1..=MAX_PAGES {
            let batch = match self.provider.page(topic, from, self.page_size, page).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(page, error = %e, "Provider page failed; stopping pagination");
                    break;
                }
            };
            if batch.is_empty() {
                info!(page, "Provider returned an empty page; stopping pagination");
                break;
            }

            for article in batch {
                if !seen.insert(article.url.clone()) {
                    continue;
                }
                if self.gatekeeper.is_relevant(&article).await {
                    accepted.push(article);
                    if accepted.len() >= desired_count {
                        break 'pages;
                    }
                }
            }
        }

        if accepted.is_empty() {
            return Err(Box::new(NoArticlesError {
                topic: topic.to_string(),
            }));
        }

        accepted.truncate(desired_count);
        if let Err(e) = self.cache.store_article_list(topic, &accepted).await {
            warn!(topic, error = %e, "Failed to persist article-list cache entry");
        }
        info!(
            topic,
            count = accepted.len(),
            candidates_seen = seen.len(),
            "Scouting complete"
        );
        Ok(accepted)
    }
}
