//! Adapter interfaces for external services.
//!
//! Each remote dependency (completion endpoint, search endpoint, article
//! pages) sits behind a narrow seam so the pipeline can be exercised with
//! scripted implementations in tests.

pub mod completion;
pub mod extract;
pub mod search;

use async_trait::async_trait;

use crate::domain::{CompletionRequest, SearchHit};

pub use completion::{CompletionClient, CompletionError, HttpCompletionBackend, ModelRoster};
pub use extract::ContentExtractor;
pub use search::{HttpSearchProvider, SearchGateway};

/// Transport for chat-completion calls.
///
/// Implementations perform exactly one attempt against one model; retry,
/// failover, and fallback policy live in `CompletionClient`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion attempt against the named model
    async fn complete(
        &self,
        model: &str,
        request: &CompletionRequest,
    ) -> Result<String, CompletionError>;
}

/// Transport for web search queries.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Issue one search query, returning up to `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Source of article text for evidence gathering.
///
/// Absence is the failure signal: extraction is expected to fail for some
/// hits and the pipeline degrades instead of erroring.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch and reduce one article to a bounded plain-text excerpt
    async fn extract(&self, url: &str) -> Option<String>;
}
