//! Article content extraction.
//!
//! Fetches a search-hit URL and reduces the HTML to a bounded plain-text
//! excerpt: script/style blocks dropped, paragraph text concatenated,
//! whitespace collapsed. Extraction failure is expected (paywalls, bot
//! walls, dead links) and surfaces as `None`, never as an error.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::evidence::MAX_EXCERPT_CHARS;

use super::ArticleSource;

/// Browser-like user agent; many news sites refuse the default one
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>")
            .expect("valid regex")
    })
}

fn paragraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Fetches article pages and reduces them to plain-text excerpts.
pub struct ContentExtractor {
    client: reqwest::Client,
    max_chars: usize,
}

impl ContentExtractor {
    /// Create an extractor with the given fetch timeout
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            max_chars: MAX_EXCERPT_CHARS,
        })
    }

    /// Override the excerpt budget
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

#[async_trait]
impl ArticleSource for ContentExtractor {
    /// Fetch a URL and reduce it to a bounded plain-text excerpt.
    ///
    /// Returns `None` on any transport failure or non-2xx status.
    async fn extract(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "Failed to fetch article");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!(url, status = status.as_u16(), "Article fetch rejected");
            return None;
        }

        let html = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!(url, error = %e, "Failed to read article body");
                return None;
            }
        };

        let text = reduce_html(&html, self.max_chars);
        if text.is_empty() {
            debug!(url, "Article contained no paragraph text");
            return None;
        }

        Some(text)
    }
}

/// Reduce HTML to paragraph text, collapsed and bounded to `max_chars`
/// (plus a 3-character ellipsis marker when truncated).
pub fn reduce_html(html: &str, max_chars: usize) -> String {
    let stripped = script_style_re().replace_all(html, " ");

    let mut paragraphs = Vec::new();
    for cap in paragraph_re().captures_iter(&stripped) {
        let inner = tag_re().replace_all(&cap[1], " ");
        let decoded = decode_entities(&inner);
        let trimmed = decoded.trim();
        if !trimmed.is_empty() {
            paragraphs.push(trimmed.to_string());
        }
    }

    let joined = paragraphs.join(" ");
    let collapsed = whitespace_re().replace_all(&joined, " ").trim().to_string();

    if collapsed.chars().count() > max_chars {
        let cut: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

/// Decode the handful of entities that matter for news-article text
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_html_keeps_paragraph_text() {
        let html = r#"
            <html><head><title>Ignored</title></head>
            <body>
                <p>First paragraph.</p>
                <div>Skipped block</div>
                <p class="lead">Second   paragraph.</p>
            </body></html>
        "#;

        assert_eq!(
            reduce_html(html, 2000),
            "First paragraph. Second paragraph."
        );
    }

    #[test]
    fn test_reduce_html_drops_script_and_style() {
        let html = r#"
            <script>var x = "<p>not content</p>";</script>
            <style>p { color: red; }</style>
            <p>Real content.</p>
        "#;

        assert_eq!(reduce_html(html, 2000), "Real content.");
    }

    #[test]
    fn test_reduce_html_strips_inline_tags() {
        let html = "<p>Flood <b>kills</b> <a href=\"#\">50</a> in Riverdale</p>";
        assert_eq!(reduce_html(html, 2000), "Flood kills 50 in Riverdale");
    }

    #[test]
    fn test_reduce_html_decodes_entities() {
        let html = "<p>Smith &amp; Sons said &quot;no&quot;</p>";
        assert_eq!(reduce_html(html, 2000), "Smith & Sons said \"no\"");
    }

    #[test]
    fn test_reduce_html_truncates_with_ellipsis() {
        let body = "word ".repeat(600);
        let html = format!("<p>{}</p>", body);
        let text = reduce_html(&html, 2000);

        assert_eq!(text.chars().count(), 2003);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_reduce_html_empty_for_no_paragraphs() {
        assert_eq!(reduce_html("<div>no paragraphs here</div>", 2000), "");
    }
}
