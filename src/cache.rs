//! Two-tier disk cache: article lists by topic, analyses by content hash.
//!
//! Two independent namespaces live under the cache root:
//!
//! ```text
//! cache_dir/
//! ├── articles/
//! │   └── {topic-slug}.json      # CachedArticleList, 24h TTL + min-count gate
//! └── analysis/
//!     └── {sha256-hex}.json      # CachedAnalysis, no TTL (prompt fingerprint
//!                                #   in the key handles invalidation)
//! ```
//!
//! Reads that miss, are expired, are undersized, or fail to parse are all
//! treated identically to cache-absent. Writes are whole-value overwrites,
//! landed via write-then-rename so an interrupted run never leaves a
//! truncated entry behind.

use crate::models::{Article, CachedAnalysis, CachedArticleList};
use crate::utils::slugify;
use chrono::{Duration, Utc};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Freshness window for the article-list namespace.
pub const ARTICLE_LIST_TTL_HOURS: i64 = 24;

/// Filesystem-backed cache store with the two namespaces.
#[derive(Debug, Clone)]
pub struct CacheStore {
    articles_dir: PathBuf,
    analysis_dir: PathBuf,
}

impl CacheStore {
    /// Open (and create if needed) the cache directories under `root`.
    pub async fn new(root: &Path) -> Result<Self, Box<dyn Error>> {
        let articles_dir = root.join("articles");
        let analysis_dir = root.join("analysis");
        fs::create_dir_all(&articles_dir).await?;
        fs::create_dir_all(&analysis_dir).await?;
        Ok(Self {
            articles_dir,
            analysis_dir,
        })
    }

    /// Load the cached article list for a topic.
    ///
    /// Returns `None` when the entry is missing, unreadable, older than
    /// [`ARTICLE_LIST_TTL_HOURS`], or holds fewer than `min_count` articles.
    /// TTL is the primary gate, count the secondary: an expired entry is
    /// never preferred no matter how large it is.
    pub async fn load_article_list(&self, topic: &str, min_count: usize) -> Option<Vec<Article>> {
        let path = self.article_list_path(topic);
        let raw = fs::read_to_string(&path).await.ok()?;
        let entry: CachedArticleList = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable article-list cache entry");
                return None;
            }
        };
        let age = Utc::now() - entry.fetched_at;
        if age > Duration::hours(ARTICLE_LIST_TTL_HOURS) {
            debug!(topic, age_hours = age.num_hours(), "Article-list cache entry expired");
            return None;
        }
        if entry.articles.len() < min_count {
            debug!(
                topic,
                cached = entry.articles.len(),
                required = min_count,
                "Article-list cache entry undersized"
            );
            return None;
        }
        Some(entry.articles)
    }

    /// Overwrite the topic's article-list entry with a fresh timestamp.
    pub async fn store_article_list(
        &self,
        topic: &str,
        articles: &[Article],
    ) -> Result<(), Box<dyn Error>> {
        let entry = CachedArticleList {
            topic: topic.to_string(),
            fetched_at: Utc::now(),
            articles: articles.to_vec(),
        };
        let path = self.article_list_path(topic);
        write_atomic(&path, &serde_json::to_string_pretty(&entry)?).await?;
        debug!(topic, count = articles.len(), path = %path.display(), "Stored article-list cache entry");
        Ok(())
    }

    /// Load a cached analysis by key. Unreadable entries read as absent.
    pub async fn load_analysis(&self, key: &str) -> Option<CachedAnalysis> {
        let path = self.analysis_path(key);
        let raw = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding unreadable analysis cache entry");
                None
            }
        }
    }

    /// Persist an analysis under its key, overwriting any prior entry.
    pub async fn store_analysis(
        &self,
        key: &str,
        entry: &CachedAnalysis,
    ) -> Result<(), Box<dyn Error>> {
        let path = self.analysis_path(key);
        write_atomic(&path, &serde_json::to_string_pretty(entry)?).await?;
        debug!(key, path = %path.display(), "Stored analysis cache entry");
        Ok(())
    }

    fn article_list_path(&self, topic: &str) -> PathBuf {
        self.articles_dir.join(format!("{}.json", slugify(topic)))
    }

    fn analysis_path(&self, key: &str) -> PathBuf {
        self.analysis_dir.join(format!("{key}.json"))
    }
}

/// Write the full contents to a temporary sibling, then rename into place.
/// Rename is atomic on the same filesystem, so readers only ever see whole
/// entries.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
