//! Search query generation.
//!
//! Asks the model for candidate news headlines related to the post, then
//! falls back to a deterministic segmentation of the post text itself when
//! generation degrades or yields nothing.

use tracing::debug;

use crate::adapters::completion::HEADLINE_PROMPT_MARKER;
use crate::adapters::{CompletionBackend, CompletionClient};
use crate::domain::CompletionRequest;

/// Queries produced for the search stage.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// 1..3 search-ready query strings
    pub queries: Vec<String>,

    /// True when the word-window fallback produced them
    pub degraded: bool,
}

/// Generate up to three search queries for the post.
pub async fn generate_queries<B: CompletionBackend>(
    client: &mut CompletionClient<B>,
    source_text: &str,
) -> QueryPlan {
    let prompt = format!(
        "{} related to this post that would help fact-check it:\n\n\"{}\"\n\nFormat: One headline per line.",
        HEADLINE_PROMPT_MARKER, source_text
    );

    let result = client.generate(CompletionRequest::new(prompt, 0.3, 150)).await;

    let lines: Vec<String> = result
        .text()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(3)
        .map(String::from)
        .collect();

    // The Degraded tag replaces sniffing the text for error markers: a
    // degraded result means the model never answered, so the post text
    // itself is the better query source.
    if result.is_degraded() || lines.is_empty() {
        let queries = segment_queries(source_text);
        debug!(count = queries.len(), "Using segmented post text as search queries");
        return QueryPlan {
            queries,
            degraded: true,
        };
    }

    debug!(count = lines.len(), "Generated headlines for search");
    QueryPlan {
        queries: lines,
        degraded: false,
    }
}

/// Deterministic fallback: up to three ~10-word windows over the post
/// (first ten, next ten, last ten; overlap permitted), or the whole post
/// when it is ten words or fewer.
fn segment_queries(source_text: &str) -> Vec<String> {
    let words: Vec<&str> = source_text.split_whitespace().collect();

    if words.len() > 10 {
        let segments = vec![
            words[..10].join(" "),
            words[10..words.len().min(20)].join(" "),
            words[words.len() - 10..].join(" "),
        ];
        let segments: Vec<String> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        if !segments.is_empty() {
            return segments;
        }
    }

    vec![source_text.trim().to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_post_becomes_single_query() {
        let queries = segment_queries("Flood kills 50 in Riverdale");
        assert_eq!(queries, vec!["Flood kills 50 in Riverdale"]);
    }

    #[test]
    fn test_long_post_yields_three_windows() {
        let source = (1..=25)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let queries = segment_queries(&source);

        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10");
        assert_eq!(queries[1], "w11 w12 w13 w14 w15 w16 w17 w18 w19 w20");
        assert_eq!(queries[2], "w16 w17 w18 w19 w20 w21 w22 w23 w24 w25");
    }

    #[test]
    fn test_windows_overlap_between_middle_and_tail() {
        // 12 words: middle window is words 11-12, tail window is words 3-12
        let source = "a b c d e f g h i j k l";
        let queries = segment_queries(source);

        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "a b c d e f g h i j");
        assert_eq!(queries[1], "k l");
        assert_eq!(queries[2], "c d e f g h i j k l");
    }
}
