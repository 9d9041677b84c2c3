//! Data models for news articles and their bias analyses.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: a candidate article as returned by the news search provider
//! - [`Analysis`]: the LLM-produced commercial-bias analysis of one article
//! - [`CachedAnalysis`] / [`CachedArticleList`]: the on-disk cache entry shapes
//! - [`ReportRow`]: the unit the report renderer consumes
//!
//! All entities are immutable once created; the only mutable state in the
//! application is the disk cache, which holds whole-value overwrites of these
//! serialized shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A news article as returned by the search provider.
///
/// The `url` is the identity of an article: it is the de-duplication key
/// during scouting and the primary component of the analysis cache key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The article headline.
    #[serde(default)]
    pub title: String,
    /// Canonical URL; unique per article, used as cache/dedup key.
    pub url: String,
    /// Publisher name as reported by the provider.
    #[serde(default)]
    pub source: String,
    /// Provider-supplied teaser/description.
    #[serde(default)]
    pub description: String,
}

impl Article {
    /// Identity string used for cache keying: the URL, falling back to the
    /// title for the odd provider row that carries none.
    pub fn identity(&self) -> &str {
        if self.url.is_empty() {
            &self.title
        } else {
            &self.url
        }
    }
}

/// The structured bias analysis the model produces for one article.
///
/// The four text fields may contain lightweight markdown; the renderer is
/// responsible for converting and sanitizing them. `motive_score` rates the
/// intensity of promotional intent from 1 (none detected) to 10 (pure
/// advertisement); a missing or uninterpretable score is `None` and is
/// presented as "N/A", never treated as an error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Analysis {
    /// Plain-language summary of what the article reports.
    #[serde(default)]
    pub summary: String,
    /// Who stands to profit from the story, and what they sell.
    #[serde(default)]
    pub seller_description: String,
    /// The promotional intent detected behind the coverage, if any.
    #[serde(default)]
    pub hidden_motive: String,
    /// Promotional-intent intensity, integer 1-10 when present.
    #[serde(default, deserialize_with = "de_motive_score")]
    pub motive_score: Option<u8>,
    /// What the article omits, overstates, or fails to question.
    #[serde(default)]
    pub critique: String,
}

/// Accept a JSON number or a numeric string for `motive_score`; anything
/// else (or a value outside 1-10) reads as absent rather than failing the
/// whole analysis. Chat models are sloppy about JSON number types.
fn de_motive_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value))
}

fn score_from_value(value: &serde_json::Value) -> Option<u8> {
    let n = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (1..=10).contains(&n).then_some(n as u8)
}

/// On-disk entry of the per-article analysis cache.
///
/// Keyed externally by a hash of the article identity and the exact prompt
/// text, so entries never need manual invalidation when prompts evolve.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CachedAnalysis {
    pub title: String,
    pub url: String,
    pub analysis: Analysis,
    pub cached_at: DateTime<Utc>,
}

/// On-disk entry of the article-list cache, keyed by topic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CachedArticleList {
    pub topic: String,
    pub fetched_at: DateTime<Utc>,
    pub articles: Vec<Article>,
}

/// One successfully analyzed article, in processing order; the unit the
/// report renderer consumes.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub title: String,
    pub url: String,
    pub source: String,
    pub analysis: Analysis,
}
