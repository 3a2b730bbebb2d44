//! Pipeline Integration Tests
//!
//! End-to-end runs against scripted completion, search, and article
//! sources: degraded-stage bookkeeping, URL dedup, evidence substitution,
//! and the keyword-overlap verdict path.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use postcheck::adapters::completion::CompletionError;
use postcheck::adapters::{
    ArticleSource, CompletionBackend, CompletionClient, ModelRoster, SearchGateway, SearchProvider,
};
use postcheck::core::FactCheckPipeline;
use postcheck::domain::{CompletionRequest, Register, SearchHit, Verdict};

/// Backend replaying scripted outcomes; an empty script errors.
struct ScriptedBackend {
    responses: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
        }
    }

    /// Backend whose every call fails at the transport level
    fn offline() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(
        &self,
        _model: &str,
        _request: &CompletionRequest,
    ) -> Result<String, CompletionError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::Transport("script exhausted".to_string())))
    }
}

/// Provider returning the same canned hits for every query
struct CannedSearch {
    hits: Vec<SearchHit>,
}

#[async_trait]
impl SearchProvider for CannedSearch {
    async fn search(&self, _query: &str, _max: usize) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.hits.clone())
    }
}

/// Article source serving canned bodies by URL
struct CannedArticles {
    bodies: HashMap<String, String>,
}

#[async_trait]
impl ArticleSource for CannedArticles {
    async fn extract(&self, url: &str) -> Option<String> {
        self.bodies.get(url).cloned()
    }
}

fn hit(url: &str, title: &str, snippet: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
    }
}

fn offline_client() -> CompletionClient<ScriptedBackend> {
    CompletionClient::new(ScriptedBackend::offline(), ModelRoster::new("model", vec![]))
        .with_retry_policy(3, Duration::ZERO)
}

fn scripted_client(responses: Vec<Result<String, CompletionError>>) -> CompletionClient<ScriptedBackend> {
    CompletionClient::new(ScriptedBackend::new(responses), ModelRoster::new("model", vec![]))
        .with_retry_policy(3, Duration::ZERO)
}

#[tokio::test]
async fn test_empty_post_is_rejected() {
    let mut pipeline = FactCheckPipeline::new(
        offline_client(),
        SearchGateway::new(CannedSearch { hits: vec![] }),
        CannedArticles {
            bodies: HashMap::new(),
        },
    );

    assert!(pipeline.run("   ", Register::Plain).await.is_err());
}

#[tokio::test]
async fn test_hits_deduplicated_first_seen_order() {
    let search = CannedSearch {
        hits: vec![
            hit("http://a.example/1", "A", "about a"),
            hit("http://b.example/2", "B", "about b"),
            hit("http://a.example/1", "A again", "duplicate"),
        ],
    };

    let mut pipeline = FactCheckPipeline::new(
        offline_client(),
        SearchGateway::new(search),
        CannedArticles {
            bodies: HashMap::new(),
        },
    );

    let report = pipeline
        .run("Flood kills 50 in Riverdale", Register::Plain)
        .await
        .unwrap();

    let urls: Vec<&str> = report.hits.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(urls, vec!["http://a.example/1", "http://b.example/2"]);
    // The first occurrence's title was kept
    assert_eq!(report.hits[0].title, "A");
}

#[tokio::test]
async fn test_keyword_overlap_verdict_with_model_offline() {
    // One keyword of two ("Riverdale", not "Flood") appears in the
    // evidence: 50% overlap lands in the potentially-misleading band.
    let search = CannedSearch {
        hits: vec![hit("http://news.example/flood", "Riverdale report", "local news")],
    };
    let mut bodies = HashMap::new();
    bodies.insert(
        "http://news.example/flood".to_string(),
        "No disaster reported in Riverdale this month according to officials.".to_string(),
    );

    let mut pipeline = FactCheckPipeline::new(
        offline_client(),
        SearchGateway::new(search),
        CannedArticles { bodies },
    );

    let report = pipeline
        .run("Flood kills 50 in Riverdale", Register::Plain)
        .await
        .unwrap();

    assert!(report.narrative.contains("POTENTIALLY MISLEADING"));
    assert_eq!(report.verdict, Verdict::False);
    // Headline generation and analysis both fell back
    assert!(report.degraded_stages.contains(&"headline".to_string()));
    assert!(report.degraded_stages.contains(&"analyze".to_string()));

    let reply = report.reply.expect("flagged post gets a reply");
    assert!(reply.text.starts_with("Fact check: "));
    assert!(reply.text.chars().count() <= 280);
}

#[tokio::test]
async fn test_live_model_path_affirms_true_post() {
    let search = CannedSearch {
        hits: vec![hit("http://news.example/a", "Coverage", "details")],
    };
    let mut bodies = HashMap::new();
    bodies.insert(
        "http://news.example/a".to_string(),
        "Officials confirmed the event on Tuesday.".to_string(),
    );

    // First call answers the headline prompt, second the analysis prompt
    let client = scripted_client(vec![
        Ok("Riverdale flood coverage\nRiverdale disaster response\nRiverdale emergency".to_string()),
        Ok("This post is true. Evidence confirms the event occurred.".to_string()),
    ]);

    let mut pipeline =
        FactCheckPipeline::new(client, SearchGateway::new(search), CannedArticles { bodies });

    let report = pipeline
        .run("Flood kills 50 in Riverdale", Register::Plain)
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::True);
    assert!(report.degraded_stages.is_empty());
    assert_eq!(report.queries.len(), 3);
    assert_eq!(report.excerpts.len(), 1);

    let reply = report.reply.expect("reply drafted");
    assert!(reply.text.contains("Evidence confirms the event occurred"));
}

#[tokio::test]
async fn test_extraction_failure_substitutes_titles_and_snippets() {
    let search = CannedSearch {
        hits: vec![hit(
            "http://news.example/gone",
            "Riverdale Flood Coverage",
            "Flood reported in Riverdale",
        )],
    };

    // No article bodies at all: evidence comes from titles and snippets
    let mut pipeline = FactCheckPipeline::new(
        offline_client(),
        SearchGateway::new(search),
        CannedArticles {
            bodies: HashMap::new(),
        },
    );

    let report = pipeline
        .run("Flood kills 50 in Riverdale", Register::Plain)
        .await
        .unwrap();

    assert!(report.excerpts.is_empty());
    assert!(report.degraded_stages.contains(&"extract".to_string()));
    // Title + snippet carried both keywords: partially-true band
    assert!(report.narrative.contains("PARTIALLY TRUE"));
}

#[tokio::test]
async fn test_no_evidence_reports_unverified_without_reply() {
    let mut pipeline = FactCheckPipeline::new(
        offline_client(),
        SearchGateway::new(CannedSearch { hits: vec![] }),
        CannedArticles {
            bodies: HashMap::new(),
        },
    );

    let report = pipeline
        .run("Flood kills 50 in Riverdale", Register::Plain)
        .await
        .unwrap();

    assert_eq!(report.verdict, Verdict::Unverified);
    assert!(report.reply.is_none());
    assert!(report.hits.is_empty());
    assert!(report.degraded_stages.contains(&"search".to_string()));
}
