//! Structured bias analysis per article, cache-first.
//!
//! One chat call per accepted article with a fixed skeptical-investigator
//! persona, behind a disk cache keyed by article identity plus a fingerprint
//! of the exact prompt text. Editing either prompt below silently retires
//! every cached analysis; there is no manual cache clearing.
//!
//! Unlike the gatekeeper, a failure here is loud: an unparseable response or
//! failed call propagates to the caller, which decides whether to skip the
//! article. Silently defaulting an analysis would put fabricated content in
//! the report.

use crate::cache::CacheStore;
use crate::llm::ChatClient;
use crate::models::{Analysis, Article, CachedAnalysis};
use crate::utils::truncate_for_log;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::error::Error;
use tracing::{debug, instrument};

const SYSTEM_PROMPT: &str = "You are a deeply skeptical investigative journalist covering the AI \
industry. You assume every article about AI may be quiet marketing for somebody, and your job is \
to name who. You reply with JSON only.";

const INSTRUCTION: &str = "Analyze the article below and respond with a JSON object containing \
exactly these fields: \"summary\" (two plain-language sentences on what the article reports), \
\"seller_description\" (who benefits commercially from this story and what they sell), \
\"hidden_motive\" (the promotional intent you detect behind the coverage, if any), \
\"motive_score\" (an integer from 1 to 10 rating the intensity of promotional intent), and \
\"critique\" (what the article omits, overstates, or fails to question). Light markdown is \
allowed inside field values.";

fn user_prompt(article: &Article) -> String {
    format!(
        "{INSTRUCTION}\n\nTitle: {}\nSource: {}\nURL: {}\nDescription: {}",
        article.title, article.source, article.url, article.description
    )
}

/// Deterministic analysis cache key: article identity plus a fingerprint of
/// the exact prompt text. NUL separators keep field boundaries unambiguous.
pub fn analysis_cache_key(identity: &str, system: &str, user: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update([0]);
    hasher.update(system.as_bytes());
    hasher.update([0]);
    hasher.update(user.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cached structured-analysis pass.
pub struct Investigator<'a, C> {
    chat: C,
    cache: &'a CacheStore,
}

impl<'a, C: ChatClient> Investigator<'a, C> {
    pub fn new(chat: C, cache: &'a CacheStore) -> Self {
        Self { chat, cache }
    }

    /// Analyze one article. Returns the analysis and whether it came from
    /// cache; a cache hit never touches the model.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn analyze(&self, article: &Article) -> Result<(Analysis, bool), Box<dyn Error>> {
        let user = user_prompt(article);
        let key = analysis_cache_key(article.identity(), SYSTEM_PROMPT, &user);

        if let Some(hit) = self.cache.load_analysis(&key).await {
            debug!(key = %key, "Analysis cache hit");
            return Ok((hit.analysis, true));
        }

        let raw = self.chat.complete(SYSTEM_PROMPT, &user).await?;
        let analysis: Analysis = serde_json::from_str(&raw).map_err(|e| {
            format!(
                "analysis response was not valid JSON: {e}; response: {}",
                truncate_for_log(&raw, 300)
            )
        })?;

        let entry = CachedAnalysis {
            title: article.title.clone(),
            url: article.url.clone(),
            analysis: analysis.clone(),
            cached_at: Utc::now(),
        };
        self.cache.store_analysis(&key, &entry).await?;
        Ok((analysis, false))
    }
}
