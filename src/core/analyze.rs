//! Fact-check narrative generation.
//!
//! Sends the post and the aggregated evidence to the model for a true/false
//! judgment. When the model is unreachable, a keyword-overlap heuristic
//! produces a hedged narrative instead. The heuristic is lexical overlap,
//! not semantic entailment: it measures whether the post's salient words
//! appear in the evidence at all, and its thresholds are tunable constants
//! with no validated accuracy target.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::adapters::completion::NARRATIVE_PROMPT_MARKER;
use crate::adapters::{CompletionBackend, CompletionClient};
use crate::domain::CompletionRequest;

/// Evidence text is truncated to this many characters in the prompt
const MAX_PROMPT_EVIDENCE_CHARS: usize = 3000;

/// Overlap fraction at or above which the post reads as partially true
const PARTIAL_THRESHOLD: f64 = 0.7;

/// Overlap fraction at or above which the post reads as misleading
const MISLEADING_THRESHOLD: f64 = 0.3;

const PARTIAL_NARRATIVE: &str = "Based on the articles, the post appears to be PARTIALLY \
TRUE. Some key elements mentioned in the post are found in the news articles, but \
specific details may be exaggerated or not fully verified.";

const MISLEADING_NARRATIVE: &str = "Based on the articles, the post appears to be \
POTENTIALLY MISLEADING. While some elements match news reports, many specific claims \
cannot be verified from the gathered sources.";

const UNVERIFIED_NARRATIVE: &str = "Based on the articles, the post appears to be \
UNVERIFIED. Most specific claims made in the post are not substantiated by the gathered \
sources.";

fn capitalized_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("valid regex"))
}

/// Extracts the salient keywords of a post for overlap scoring.
///
/// Pluggable so the heuristic can be swapped without touching the
/// analyzer's control flow.
pub trait KeywordTokenizer: Send + Sync {
    /// Keywords as written in the text, in order of appearance
    fn keywords(&self, text: &str) -> Vec<String>;
}

/// Default tokenizer: capitalized words, on the theory that names and
/// places carry most of a news claim.
pub struct CapitalizedWordTokenizer;

impl KeywordTokenizer for CapitalizedWordTokenizer {
    fn keywords(&self, text: &str) -> Vec<String> {
        capitalized_word_re()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Outcome of the analysis stage.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Fact-check narrative text
    pub narrative: String,

    /// True when the keyword-overlap heuristic produced it
    pub degraded: bool,
}

/// Produces fact-check narratives from post text and evidence.
pub struct VerdictAnalyzer {
    tokenizer: Box<dyn KeywordTokenizer>,
}

impl Default for VerdictAnalyzer {
    fn default() -> Self {
        Self::new(Box::new(CapitalizedWordTokenizer))
    }
}

impl VerdictAnalyzer {
    pub fn new(tokenizer: Box<dyn KeywordTokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Analyze the post against the aggregated evidence.
    pub async fn analyze<B: CompletionBackend>(
        &self,
        client: &mut CompletionClient<B>,
        source_text: &str,
        evidence_text: &str,
    ) -> Analysis {
        let evidence: String = evidence_text.chars().take(MAX_PROMPT_EVIDENCE_CHARS).collect();

        let prompt = format!(
            "{} based on news articles:\n\nPost: \"{}\"\n\nArticles summary: {}\n\nIs the post true or false? Provide brief evidence.",
            NARRATIVE_PROMPT_MARKER, source_text, evidence
        );

        let result = client.generate(CompletionRequest::new(prompt, 0.1, 400)).await;

        // Degraded tag instead of error-marker sniffing: when the model
        // never answered, score the evidence overlap locally.
        if result.is_degraded() || result.text().trim().is_empty() {
            debug!("Analyzer falling back to keyword overlap");
            return Analysis {
                narrative: self.overlap_narrative(source_text, evidence_text),
                degraded: true,
            };
        }

        Analysis {
            narrative: result.into_text(),
            degraded: false,
        }
    }

    /// Key terms joined into a single last-resort search query
    pub fn key_terms(&self, text: &str) -> String {
        self.tokenizer.keywords(text).join(" ")
    }

    /// Keyword-overlap fallback: the fraction of the post's keywords found
    /// in the evidence selects one of three hedged narrative templates.
    pub fn overlap_narrative(&self, source_text: &str, evidence_text: &str) -> String {
        let keywords = self.tokenizer.keywords(source_text);
        let evidence_lower = evidence_text.to_lowercase();

        let found = keywords
            .iter()
            .filter(|k| evidence_lower.contains(&k.to_lowercase()))
            .count();
        let total = keywords.len();

        debug!(found, total, "Keyword overlap score");

        let narrative = if found as f64 >= total as f64 * PARTIAL_THRESHOLD {
            PARTIAL_NARRATIVE
        } else if found as f64 >= total as f64 * MISLEADING_THRESHOLD {
            MISLEADING_NARRATIVE
        } else {
            UNVERIFIED_NARRATIVE
        };

        narrative.to_string()
    }
}
