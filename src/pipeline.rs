//! Sequential analysis loop: pacing and per-article failure isolation.
//!
//! Articles are processed strictly one at a time. The pause between live
//! model calls is the rate-limit control for the completion provider, so it
//! is an explicit scheduling step here, not a transport detail: no pause
//! after a cache hit, no pause after the final article.

use crate::investigator::Investigator;
use crate::llm::ChatClient;
use crate::models::{Article, ReportRow};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Analyze each article in order, skipping failures.
///
/// One bad article never aborts the run: its error is logged and the loop
/// moves on. The returned rows hold every success, in processing order.
pub async fn analyze_articles<C: ChatClient>(
    investigator: &Investigator<'_, C>,
    articles: &[Article],
    pause: Duration,
) -> Vec<ReportRow> {
    let mut rows = Vec::new();

    for (i, article) in articles.iter().enumerate() {
        info!(
            index = i,
            total = articles.len(),
            title = %article.title,
            "Analyzing article"
        );
        match investigator.analyze(article).await {
            Ok((analysis, was_cached)) => {
                rows.push(ReportRow {
                    title: article.title.clone(),
                    url: article.url.clone(),
                    source: article.source.clone(),
                    analysis,
                });
                let is_last = i + 1 == articles.len();
                if !was_cached && !is_last && !pause.is_zero() {
                    debug!(
                        pause_ms = pause.as_millis() as u64,
                        "Pausing before next analysis call"
                    );
                    sleep(pause).await;
                }
            }
            Err(e) => {
                warn!(index = i, url = %article.url, error = %e, "Analysis failed; skipping article");
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use std::cell::RefCell;
    use std::error::Error;
    use tokio::time::Instant;

    const GOOD_RESPONSE: &str = r#"{
        "summary": "s",
        "seller_description": "v",
        "hidden_motive": "m",
        "motive_score": 5,
        "critique": "c"
    }"#;

    /// Fails whenever the user prompt mentions a poisoned marker.
    struct PoisonChat {
        poison: &'static str,
        calls: RefCell<usize>,
    }

    impl PoisonChat {
        fn new(poison: &'static str) -> Self {
            Self {
                poison,
                calls: RefCell::new(0),
            }
        }
    }

    impl ChatClient for PoisonChat {
        async fn complete(&self, _system: &str, user: &str) -> Result<String, Box<dyn Error>> {
            *self.calls.borrow_mut() += 1;
            if user.contains(self.poison) {
                Err("simulated analysis failure".into())
            } else {
                Ok(GOOD_RESPONSE.to_string())
            }
        }
    }

    fn article(slug: &str) -> Article {
        Article {
            title: format!("Story {slug}"),
            url: format!("https://example.com/{slug}"),
            source: "Example Wire".to_string(),
            description: "desc".to_string(),
        }
    }

    async fn store() -> (tempfile::TempDir, CacheStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::new(tmp.path()).await.unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_run() {
        let (_tmp, cache) = store().await;
        let chat = PoisonChat::new("poisoned");
        let investigator = Investigator::new(&chat, &cache);

        let articles = vec![article("one"), article("poisoned"), article("three")];
        let rows = analyze_articles(&investigator, &articles, Duration::ZERO).await;

        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Story one", "Story three"]);
        assert_eq!(*chat.calls.borrow(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn live_analyses_are_paced_but_not_after_the_last() {
        let (_tmp, cache) = store().await;
        let chat = PoisonChat::new("nothing-matches");
        let investigator = Investigator::new(&chat, &cache);

        let articles = vec![article("a"), article("b"), article("c")];
        let t0 = Instant::now();
        let rows = analyze_articles(&investigator, &articles, Duration::from_secs(1)).await;

        assert_eq!(rows.len(), 3);
        // Two pauses: after a and after b, none after c.
        assert_eq!(t0.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn cache_hits_are_not_paced() {
        let (_tmp, cache) = store().await;
        let chat = PoisonChat::new("nothing-matches");
        let investigator = Investigator::new(&chat, &cache);

        let articles = vec![article("a"), article("b"), article("c")];
        // Warm every entry, then run again: all hits, no pauses.
        analyze_articles(&investigator, &articles, Duration::ZERO).await;

        let calls_after_warmup = *chat.calls.borrow();
        let t0 = Instant::now();
        let rows = analyze_articles(&investigator, &articles, Duration::from_secs(5)).await;

        assert_eq!(rows.len(), 3);
        assert_eq!(t0.elapsed(), Duration::ZERO);
        assert_eq!(*chat.calls.borrow(), calls_after_warmup);
    }

    #[tokio::test]
    async fn all_failures_yield_empty_rows_not_a_panic() {
        let (_tmp, cache) = store().await;
        let chat = PoisonChat::new("Story");
        let investigator = Investigator::new(&chat, &cache);

        let articles = vec![article("a"), article("b")];
        let rows = analyze_articles(&investigator, &articles, Duration::ZERO).await;
        assert!(rows.is_empty());
    }
}
