//! Pipeline orchestration.
//!
//! Strictly sequential: queries, then search, then extraction, then
//! analysis, then reply composition, each stage fully materialized before
//! the next. Every stage degrades instead of failing, so a run only errors
//! on unusable input. Construct a fresh pipeline (and with it a fresh
//! completion client) per run: the model-roster cursor never resets.

use anyhow::Result;
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{
    ArticleSource, CompletionBackend, CompletionClient, SearchGateway, SearchProvider,
};
use crate::domain::evidence::MAX_EXCERPT_CHARS;
use crate::domain::{dedupe_by_url, EvidenceExcerpt, FactCheckReport, Register, Verdict};

use super::analyze::VerdictAnalyzer;
use super::{headline, reply};

/// Articles read per run, after dedup
const MAX_ARTICLES: usize = 3;

/// Narrative reported when no evidence could be gathered at all
const INSUFFICIENT_EVIDENCE_NARRATIVE: &str =
    "No supporting articles could be found; the claims in this post could not be verified.";

/// The full fact-check pipeline.
pub struct FactCheckPipeline<B: CompletionBackend, S: SearchProvider, A: ArticleSource> {
    client: CompletionClient<B>,
    search: SearchGateway<S>,
    extractor: A,
    analyzer: VerdictAnalyzer,
}

impl<B: CompletionBackend, S: SearchProvider, A: ArticleSource> FactCheckPipeline<B, S, A> {
    pub fn new(client: CompletionClient<B>, search: SearchGateway<S>, extractor: A) -> Self {
        Self {
            client,
            search,
            extractor,
            analyzer: VerdictAnalyzer::default(),
        }
    }

    /// Override the analyzer (e.g. to swap the keyword tokenizer)
    pub fn with_analyzer(mut self, analyzer: VerdictAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Run the full pipeline over one post.
    ///
    /// Fails only on empty input; every downstream failure degrades into
    /// fallback output recorded in `degraded_stages`.
    #[instrument(skip_all)]
    pub async fn run(&mut self, source_text: &str, register: Register) -> Result<FactCheckReport> {
        let source_text = source_text.trim();
        if source_text.is_empty() {
            anyhow::bail!("Post text is empty");
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut degraded_stages = Vec::new();

        info!(%run_id, "Starting fact-check run");

        // Stage 1: search queries
        let plan = headline::generate_queries(&mut self.client, source_text).await;
        if plan.degraded {
            degraded_stages.push("headline".to_string());
        }
        info!(queries = plan.queries.len(), "Generated search queries");

        // Stage 2: search and dedup (first occurrence wins)
        let mut all_hits = Vec::new();
        for query in &plan.queries {
            all_hits.extend(self.search.search(query).await);
        }
        let mut hits = dedupe_by_url(all_hits);

        // Last resort: re-query with the post's capitalized key terms
        if hits.is_empty() {
            let key_terms = self.analyzer.key_terms(source_text);
            if !key_terms.is_empty() {
                warn!(%key_terms, "No search results, retrying with key terms");
                hits = dedupe_by_url(self.search.search(&key_terms).await);
            }
            degraded_stages.push("search".to_string());
        }

        if hits.is_empty() {
            warn!(%run_id, "No evidence available, reporting unverified");
            return Ok(FactCheckReport {
                run_id,
                source_text: source_text.to_string(),
                queries: plan.queries,
                hits: Vec::new(),
                excerpts: Vec::new(),
                narrative: INSUFFICIENT_EVIDENCE_NARRATIVE.to_string(),
                verdict: Verdict::Unverified,
                reply: None,
                degraded_stages,
                started_at,
                completed_at: Utc::now(),
            });
        }

        hits.truncate(MAX_ARTICLES);
        info!(hits = hits.len(), "Search hits after dedup");

        // Stage 3: article extraction
        let mut excerpts = Vec::new();
        for (index, hit) in hits.iter().enumerate() {
            if let Some(text) = self.extractor.extract(&hit.url).await {
                let truncated = text.chars().count() > MAX_EXCERPT_CHARS;
                excerpts.push(EvidenceExcerpt {
                    source_index: index,
                    text,
                    truncated,
                });
            }
        }

        // Missing article bodies degrade to title/snippet substitution
        let evidence_text = if excerpts.is_empty() {
            warn!("No article bodies extracted, substituting titles and snippets");
            degraded_stages.push("extract".to_string());
            hits.iter()
                .map(|h| format!("Article title: {}\nDescription: {}", h.title, h.snippet))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            excerpts
                .iter()
                .map(EvidenceExcerpt::summarized)
                .collect::<Vec<_>>()
                .join(" ")
        };

        // Stage 4: narrative analysis
        let analysis = self
            .analyzer
            .analyze(&mut self.client, source_text, &evidence_text)
            .await;
        if analysis.degraded {
            degraded_stages.push("analyze".to_string());
        }

        // Stage 5: verdict and reply
        let verdict = reply::verdict(&analysis.narrative);
        let draft = reply::compose(&mut self.client, register, &analysis.narrative, source_text).await;

        info!(%run_id, %verdict, degraded = degraded_stages.len(), "Fact-check run complete");

        Ok(FactCheckReport {
            run_id,
            source_text: source_text.to_string(),
            queries: plan.queries,
            hits,
            excerpts,
            narrative: analysis.narrative,
            verdict,
            reply: Some(draft),
            degraded_stages,
            started_at,
            completed_at: Utc::now(),
        })
    }
}
