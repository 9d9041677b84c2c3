//! # Hype Hound
//!
//! A news analysis pipeline that fetches recent articles on a topic, filters
//! them for concrete AI business relevance with a language model, runs a
//! second skeptical-investigator pass per article to surface commercial bias
//! and hidden promotional motive, and renders a self-contained HTML report.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... LLM_API_KEY=... hype_hound --topic "enterprise AI"
//! ```
//!
//! ## Architecture
//!
//! The application follows a strictly sequential pipeline:
//! 1. **Scouting**: page through the news provider, gate each candidate with
//!    a relevance classification call, de-duplicate by URL (cache-first, 24h)
//! 2. **Investigation**: one structured bias analysis per article, behind a
//!    prompt-fingerprinted disk cache; failures skip the article, never the run
//! 3. **Pacing**: an explicit pause between live model calls respects
//!    provider rate limits
//! 4. **Reporting**: render one HTML document, named by the run's end date
//!
//! Articles are processed one at a time on purpose; the pacing delay is the
//! rate-limit mechanism, so nothing here is parallelized.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod gatekeeper;
mod investigator;
mod llm;
mod models;
mod news;
mod pipeline;
mod report;
mod scout;
mod utils;

use cache::CacheStore;
use cli::Cli;
use gatekeeper::Gatekeeper;
use investigator::Investigator;
use llm::{OpenAiChatClient, RetryChat};
use news::NewsApiClient;
use scout::Scout;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env first: clap's env fallbacks and RUST_LOG both read from it
    let _ = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("hype_hound starting up");

    let args = Cli::parse();
    debug!(
        topic = %args.topic,
        max_articles = args.max_articles,
        page_size = args.page_size,
        delay_ms = args.delay_ms,
        "Parsed CLI arguments"
    );

    // Early check: fail on an unwritable report directory before any
    // network spend
    if let Err(e) = ensure_writable_dir(&args.reports_dir).await {
        error!(
            path = %args.reports_dir,
            error = %e,
            "Reports directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let cache = CacheStore::new(Path::new(&args.cache_dir)).await?;
    let news = NewsApiClient::new(&args.news_base_url, &args.news_api_key)?;
    let chat = RetryChat::new(
        OpenAiChatClient::new(&args.llm_base_url, &args.llm_api_key, &args.llm_model)?,
        3,
        Duration::from_secs(1),
    );
    let gatekeeper = Gatekeeper::new(&chat);

    // ---- Scout articles ----
    let scout = Scout::new(&news, &gatekeeper, &cache, args.page_size);
    let articles = match scout.fetch(&args.topic, args.max_articles).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(topic = %args.topic, error = %e, "Scouting failed; no report can be produced");
            return Err(e);
        }
    };
    info!(count = articles.len(), "Articles to investigate");

    // ---- Analyze articles, one at a time ----
    let investigator = Investigator::new(&chat, &cache);
    let rows = pipeline::analyze_articles(
        &investigator,
        &articles,
        Duration::from_millis(args.delay_ms),
    )
    .await;

    let failed = articles.len() - rows.len();
    info!(
        total = articles.len(),
        successful = rows.len(),
        failed,
        "Completed article analysis"
    );
    if failed > 0 {
        warn!(failed, "Some articles were skipped; the report holds the rest");
    }

    // ---- Report ----
    let html = report::render(&args.topic, &rows);
    let end_date = Local::now().date_naive();
    let report_path = format!("{}/{}.html", args.reports_dir.trim_end_matches('/'), end_date);
    if let Err(e) = tokio::fs::write(&report_path, html).await {
        error!(path = %report_path, error = %e, "Failed writing report");
        return Err(e.into());
    }
    info!(path = %report_path, articles = rows.len(), "Wrote HTML report");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
