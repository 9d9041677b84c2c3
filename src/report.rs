//! HTML report rendering.
//!
//! Pure presentation: a list of analyzed articles in, one self-contained
//! HTML document out (inline styles, no external assets). The four
//! model-authored text fields are rendered from markdown and then sanitized,
//! since the model can echo hostile markup it saw in an article straight
//! back into its analysis.
//!
//! Sanitization strips `<script>` elements, inline `on*=` handler
//! attributes, and `javascript:` URIs from the rendered fragments.
//! Everything that is not model-authored (titles, sources, URLs) is plain
//! HTML-escaped instead.

use crate::models::ReportRow;
use crate::scout::LOOKBACK_DAYS;
use chrono::{Duration, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};
use once_cell::sync::Lazy;
use pulldown_cmark::{Options, Parser, html};
use regex::Regex;
use url::Url;

static SCRIPT_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static SCRIPT_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?script\b[^>]*>").unwrap());
static EVENT_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+on\w+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap());
static JS_URI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(href|src)\s*=\s*("\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]*)"#)
        .unwrap()
});

/// Risk tier derived from the motive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// 8-10 high, 4-7 medium, everything else (including absent) low.
    pub fn from_score(score: Option<u8>) -> Self {
        match score {
            Some(8..=10) => RiskTier::High,
            Some(4..=7) => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }

    fn css_class(self) -> &'static str {
        match self {
            RiskTier::High => "tier-high",
            RiskTier::Medium => "tier-medium",
            RiskTier::Low => "tier-low",
        }
    }
}

/// Render one model-authored field: markdown to HTML, then sanitize.
fn render_field(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::empty());
    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);
    sanitize_fragment(&rendered)
}

/// Strip script elements, inline event handlers, and javascript: URIs from
/// a rendered HTML fragment.
fn sanitize_fragment(fragment: &str) -> String {
    let out = SCRIPT_BLOCK_RE.replace_all(fragment, "");
    let out = SCRIPT_TAG_RE.replace_all(&out, "");
    let out = EVENT_ATTR_RE.replace_all(&out, "");
    let out = JS_URI_RE.replace_all(&out, r##"${1}="#""##);
    out.into_owned()
}

/// Extract the domain name before the TLD for a compact source tag.
/// For example: "https://www.example.com/a" -> "example".
fn domain_tag(url_str: &str) -> Option<String> {
    let parsed = Url::parse(url_str).ok()?;
    let host = parsed.host_str()?;
    let parts: Vec<&str> = host.split('.').collect();
    (parts.len() >= 2).then(|| parts[parts.len() - 2].to_string())
}

fn motive_badge(score: Option<u8>) -> String {
    let tier = RiskTier::from_score(score);
    let label = match score {
        Some(n) => format!("{n} / 10"),
        None => "N/A".to_string(),
    };
    format!(
        r#"<span class="badge {}">{}</span>"#,
        tier.css_class(),
        label
    )
}

const STYLE: &str = "\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;margin:0;background:#f5f5f2;color:#222;}
.header{background:#1a1a2e;color:#fff;padding:24px 32px;}
.header h1{margin:0;font-size:22px;}
.header p{margin:6px 0 0;font-size:13px;color:#b8b8c8;}
table{width:100%;border-collapse:collapse;background:#fff;font-size:14px;}
th{background:#ececec;text-align:left;padding:10px 12px;font-size:12px;text-transform:uppercase;letter-spacing:.04em;color:#555;}
td{padding:12px;border-top:1px solid #e4e4e4;vertical-align:top;line-height:1.45;}
td p{margin:0 0 8px;}
td p:last-child{margin-bottom:0;}
a{color:#0066cc;}
.source-tag{background:#f0f0f0;padding:2px 8px;border-radius:10px;font-size:11px;color:#555;}
.badge{display:inline-block;padding:3px 10px;border-radius:4px;font-size:12px;font-weight:600;white-space:nowrap;}
.tier-high{background:#fdecea;color:#c62828;}
.tier-medium{background:#fff8e1;color:#e65100;}
.tier-low{background:#e8f5e9;color:#2e7d32;}
.empty{color:#888;text-align:center;padding:40px;}
.wrap{padding:24px 32px;}
";

/// Render the full report document. Pure: the caller writes the bytes out.
///
/// Rows appear in input order, one table row per analyzed article. The
/// header names the topic and the coverage window (today minus the lookback
/// through today).
pub fn render(topic: &str, rows: &[ReportRow]) -> String {
    let end = Local::now().date_naive();
    let start = end - Duration::days(LOOKBACK_DAYS);

    let mut body = String::new();
    if rows.is_empty() {
        body.push_str(r#"<p class="empty">No articles were analyzed in this run.</p>"#);
    } else {
        body.push_str(
            "<table>\n<thead><tr>\
             <th>Article</th><th>Summary</th><th>Who's selling</th>\
             <th>Hidden motive</th><th>Motive</th><th>Critique</th>\
             </tr></thead>\n<tbody>\n",
        );
        for row in rows {
            let tag = domain_tag(&row.url)
                .map(|t| format!(r#" <span class="source-tag">{}</span>"#, encode_text(&t)))
                .unwrap_or_default();
            body.push_str(&format!(
                "<tr>\
                 <td><a href=\"{href}\">{title}</a><br>{source}{tag}</td>\
                 <td>{summary}</td><td>{seller}</td><td>{motive}</td>\
                 <td>{badge}</td><td>{critique}</td>\
                 </tr>\n",
                href = encode_double_quoted_attribute(&row.url),
                title = encode_text(&row.title),
                source = encode_text(&row.source),
                tag = tag,
                summary = render_field(&row.analysis.summary),
                seller = render_field(&row.analysis.seller_description),
                motive = render_field(&row.analysis.hidden_motive),
                badge = motive_badge(row.analysis.motive_score),
                critique = render_field(&row.analysis.critique),
            ));
        }
        body.push_str("</tbody>\n</table>");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Hype Hound — {topic_title}</title>\n<style>\n{style}</style>\n</head>\n<body>\n\
         <div class=\"header\">\n<h1>Hype Hound</h1>\n\
         <p>Who profits from the news? Topic: {topic_text} · Coverage window: {start} — {end}</p>\n\
         </div>\n<div class=\"wrap\">\n{body}\n</div>\n</body>\n</html>\n",
        topic_title = encode_text(topic),
        style = STYLE,
        topic_text = encode_text(topic),
        start = start,
        end = end,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Analysis;

    fn analysis(json: &str) -> Analysis {
        serde_json::from_str(json).unwrap()
    }

    fn row(title: &str, analysis_json: &str) -> ReportRow {
        ReportRow {
            title: title.to_string(),
            url: format!("https://news.example.com/{}", title.replace(' ', "-")),
            source: "Example Wire".to_string(),
            analysis: analysis(analysis_json),
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(RiskTier::from_score(Some(10)), RiskTier::High);
        assert_eq!(RiskTier::from_score(Some(9)), RiskTier::High);
        assert_eq!(RiskTier::from_score(Some(8)), RiskTier::High);
        assert_eq!(RiskTier::from_score(Some(7)), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(Some(4)), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(Some(3)), RiskTier::Low);
        assert_eq!(RiskTier::from_score(Some(1)), RiskTier::Low);
        assert_eq!(RiskTier::from_score(None), RiskTier::Low);
    }

    #[test]
    fn script_blocks_never_survive() {
        let report = render(
            "ai",
            &[row(
                "evil",
                r#"{"summary":"before <script>alert(1)</script> after","motive_score":5}"#,
            )],
        );
        assert!(!report.to_lowercase().contains("<script>alert"));
        assert!(report.contains("before"));
        assert!(report.contains("after"));
    }

    #[test]
    fn stray_script_tags_are_stripped() {
        let report = render(
            "ai",
            &[row("evil", r#"{"summary":"x <ScRiPt src=a.js> y"}"#)],
        );
        let lower = report.to_lowercase();
        // The document's own <style> is fine; no script element allowed.
        assert!(!lower.contains("<script"));
    }

    #[test]
    fn inline_event_handlers_are_stripped() {
        let report = render(
            "ai",
            &[row(
                "evil",
                r#"{"critique":"<img src=x onerror=alert(1)> plus <b onclick=\"steal()\">bold</b>"}"#,
            )],
        );
        let lower = report.to_lowercase();
        assert!(!lower.contains("onerror"));
        assert!(!lower.contains("onclick"));
        assert!(report.contains("bold"));
    }

    #[test]
    fn javascript_uris_are_neutralized() {
        let report = render(
            "ai",
            &[row(
                "evil",
                r#"{"hidden_motive":"<a href=\"javascript:alert(1)\">click</a>"}"#,
            )],
        );
        assert!(!report.to_lowercase().contains("javascript:alert"));
        assert!(report.contains("click"));
    }

    #[test]
    fn markdown_fields_render_to_html() {
        let report = render(
            "ai",
            &[row("md", r#"{"summary":"This is **bold** talk."}"#)],
        );
        assert!(report.contains("<strong>bold</strong>"));
    }

    #[test]
    fn high_score_gets_high_tier_badge() {
        let report = render("ai", &[row("hot", r#"{"motive_score":9}"#)]);
        assert!(report.contains(r#"<span class="badge tier-high">9 / 10</span>"#));
    }

    #[test]
    fn absent_score_renders_na_low_tier_badge() {
        let report = render("ai", &[row("meh", r#"{"summary":"s"}"#)]);
        assert!(report.contains(r#"<span class="badge tier-low">N/A</span>"#));
    }

    #[test]
    fn rows_appear_in_input_order() {
        let report = render(
            "ai",
            &[
                row("first story", r#"{"motive_score":2}"#),
                row("second story", r#"{"motive_score":5}"#),
                row("third story", r#"{"motive_score":8}"#),
            ],
        );
        let i1 = report.find("first story").unwrap();
        let i2 = report.find("second story").unwrap();
        let i3 = report.find("third story").unwrap();
        assert!(i1 < i2 && i2 < i3);
    }

    #[test]
    fn titles_and_sources_are_escaped() {
        let mut r = row("t", r#"{"summary":"s"}"#);
        r.title = "<b>Sneaky</b> & Sons".to_string();
        r.source = "Wire <i>Corp</i>".to_string();
        let report = render("ai", &[r]);
        assert!(report.contains("&lt;b&gt;Sneaky&lt;/b&gt; &amp; Sons"));
        assert!(report.contains("Wire &lt;i&gt;Corp&lt;/i&gt;"));
    }

    #[test]
    fn report_header_names_topic_and_window() {
        let report = render("ai chips", &[]);
        assert!(report.contains("Topic: ai chips"));
        assert!(report.contains("Coverage window:"));
    }

    #[test]
    fn empty_run_renders_empty_state() {
        let report = render("ai", &[]);
        assert!(report.contains("No articles were analyzed"));
        assert!(!report.contains("<table>"));
    }

    #[test]
    fn domain_tag_extraction() {
        assert_eq!(
            domain_tag("https://www.nytimes.com/2026/a"),
            Some("nytimes".to_string())
        );
        assert_eq!(
            domain_tag("https://news.example.co.uk/x"),
            Some("co".to_string())
        );
        assert_eq!(domain_tag("not a url"), None);
    }
}
