//! Command-line interface definitions for Hype Hound.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can be provided via command-line flag or environment
//! variable; the two API keys are required and abort startup with clap's
//! missing-argument listing when absent.

use clap::Parser;

/// Command-line arguments for the Hype Hound application.
///
/// # Examples
///
/// ```sh
/// # Keys from the environment (or a .env file)
/// hype_hound --topic "enterprise AI"
///
/// # Everything explicit
/// hype_hound -t "ai chips" --max-articles 8 --delay-ms 2000 -r ./out
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to scout for coverage
    #[arg(short, long, env = "HYPE_TOPIC", default_value = "artificial intelligence")]
    pub topic: String,

    /// Maximum number of articles to collect and analyze
    #[arg(long, env = "MAX_ARTICLES", default_value_t = 5)]
    pub max_articles: usize,

    /// Articles per news provider page
    #[arg(long, env = "NEWS_PAGE_SIZE", default_value_t = 20)]
    pub page_size: u32,

    /// Pause between live analysis calls, in milliseconds
    #[arg(long, env = "ANALYSIS_DELAY_MS", default_value_t = 1000)]
    pub delay_ms: u64,

    /// News search API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: String,

    /// News search API base URL
    #[arg(
        long,
        env = "NEWS_API_BASE_URL",
        default_value = "https://newsapi.org/v2"
    )]
    pub news_base_url: String,

    /// Chat-completion API key
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: String,

    /// Chat-completion API base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub llm_base_url: String,

    /// Chat-completion model identifier
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    pub llm_model: String,

    /// Cache directory (article lists and analyses)
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: String,

    /// Output directory for HTML reports
    #[arg(short, long, env = "REPORTS_DIR", default_value = "reports")]
    pub reports_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "hype_hound",
            "--news-api-key",
            "news-key",
            "--llm-api-key",
            "llm-key",
        ]
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(base_args());
        assert_eq!(cli.topic, "artificial intelligence");
        assert_eq!(cli.max_articles, 5);
        assert_eq!(cli.page_size, 20);
        assert_eq!(cli.delay_ms, 1000);
        assert_eq!(cli.news_base_url, "https://newsapi.org/v2");
        assert_eq!(cli.llm_model, "gpt-4o-mini");
        assert_eq!(cli.cache_dir, "cache");
        assert_eq!(cli.reports_dir, "reports");
    }

    #[test]
    fn test_cli_overrides() {
        let mut args = base_args();
        args.extend([
            "--topic",
            "ai chips",
            "--max-articles",
            "8",
            "--delay-ms",
            "250",
            "-r",
            "/tmp/reports",
        ]);
        let cli = Cli::parse_from(args);
        assert_eq!(cli.topic, "ai chips");
        assert_eq!(cli.max_articles, 8);
        assert_eq!(cli.delay_ms, 250);
        assert_eq!(cli.reports_dir, "/tmp/reports");
    }

    #[test]
    fn test_missing_keys_are_listed() {
        // Note: passes only when NEWS_API_KEY/LLM_API_KEY are not exported,
        // since clap falls back to the environment.
        if std::env::var_os("NEWS_API_KEY").is_some() || std::env::var_os("LLM_API_KEY").is_some()
        {
            return;
        }
        let err = Cli::try_parse_from(["hype_hound"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("--news-api-key"));
        assert!(msg.contains("--llm-api-key"));
    }
}
