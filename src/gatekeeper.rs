//! Relevance gate: one classification call per candidate article.
//!
//! The gate admits an article only on an explicit positive verdict from the
//! model. Call failures, malformed JSON, and missing fields all resolve to
//! "not relevant": a flaky upstream must never flood the report with
//! unvetted articles.

use crate::llm::ChatClient;
use crate::models::Article;
use serde::Deserialize;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a strict news triage assistant for a business-intelligence \
briefing on the AI industry. You reply with JSON only.";

const INSTRUCTION: &str = "Decide whether this article concerns a concrete AI business use case, \
company strategy, or market/financial implication. Generic AI hype, opinion pieces, and pure \
research coverage do not qualify. Respond with a JSON object of the form {\"relevant\": true} \
or {\"relevant\": false}.";

#[derive(Debug, Deserialize)]
struct Verdict {
    relevant: bool,
}

/// Per-candidate relevance classifier.
pub struct Gatekeeper<C> {
    chat: C,
}

impl<C: ChatClient> Gatekeeper<C> {
    pub fn new(chat: C) -> Self {
        Self { chat }
    }

    /// Classify one candidate. Infallible by contract: every failure mode
    /// resolves to `false`.
    pub async fn is_relevant(&self, article: &Article) -> bool {
        let user = format!(
            "{INSTRUCTION}\n\nTitle: {}\nSource: {}\nDescription: {}",
            article.title, article.source, article.description
        );
        match self.chat.complete(SYSTEM_PROMPT, &user).await {
            Ok(raw) => match serde_json::from_str::<Verdict>(&raw) {
                Ok(verdict) => {
                    debug!(url = %article.url, relevant = verdict.relevant, "Gatekeeper verdict");
                    verdict.relevant
                }
                Err(e) => {
                    warn!(url = %article.url, error = %e, "Gatekeeper returned malformed JSON; excluding article");
                    false
                }
            },
            Err(e) => {
                warn!(url = %article.url, error = %e, "Gatekeeper call failed; excluding article");
                false
            }
        }
    }
}
