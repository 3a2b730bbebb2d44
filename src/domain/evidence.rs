//! Search hits and evidence excerpts.

use serde::{Deserialize, Serialize};

/// Maximum excerpt length kept per article before truncation
pub const MAX_EXCERPT_CHARS: usize = 2000;

/// Per-article budget when excerpts are aggregated for analysis
pub const MAX_AGGREGATED_CHARS: usize = 600;

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,

    /// Canonical link; dedup key
    pub url: String,

    /// Short description from the search engine
    pub snippet: String,
}

/// A bounded plain-text excerpt extracted from a search-result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceExcerpt {
    /// Index into the deduplicated hit list this excerpt came from
    pub source_index: usize,

    /// Extracted text, at most MAX_EXCERPT_CHARS plus ellipsis
    pub text: String,

    /// True if the page text exceeded the excerpt budget
    pub truncated: bool,
}

impl EvidenceExcerpt {
    /// Render this excerpt within the aggregated-evidence budget.
    ///
    /// Articles are numbered from 1 in the analyzer prompt.
    pub fn summarized(&self) -> String {
        let body: String = if self.text.chars().count() > MAX_AGGREGATED_CHARS {
            let cut: String = self.text.chars().take(MAX_AGGREGATED_CHARS).collect();
            format!("{}...", cut)
        } else {
            self.text.clone()
        };
        format!("Article {}: {}", self.source_index + 1, body)
    }
}

/// Deduplicate hits by exact URL equality.
///
/// First occurrence wins; insertion order is preserved.
pub fn dedupe_by_url(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();

    for hit in hits {
        if seen.insert(hit.url.clone()) {
            unique.push(hit);
        }
    }

    unique
}
