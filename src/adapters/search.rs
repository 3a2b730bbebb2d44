//! Web search gateway.
//!
//! One call, one fresh query. Search failure is non-fatal by design: a
//! failed query degrades the evidence pool instead of aborting the run, so
//! errors are logged and swallowed here. Result aggregation and URL dedup
//! belong to the pipeline, not this component.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::SearchHit;

use super::SearchProvider;

/// Default result cap per query
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Default recency qualifier appended to every query
pub const DEFAULT_RECENCY_QUALIFIER: &str = "after:2020-01-01";

/// Wire shape of the search endpoint response
#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

/// HTTP JSON search provider.
///
/// Expects a GET endpoint taking `q` and `max_results` query parameters and
/// returning `{"results": [{"title", "url", "snippet"}, ...]}`.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSearchProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("max_results", &max_results.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results)
    }
}

/// Search gateway: applies the recency qualifier and the result cap,
/// and converts provider failures into empty result sets.
pub struct SearchGateway<P: SearchProvider> {
    provider: P,
    max_results: usize,
    recency_qualifier: String,
}

impl<P: SearchProvider> SearchGateway<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_results: DEFAULT_MAX_RESULTS,
            recency_qualifier: DEFAULT_RECENCY_QUALIFIER.to_string(),
        }
    }

    /// Override the per-query result cap
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Override the recency qualifier
    pub fn with_recency_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.recency_qualifier = qualifier.into();
        self
    }

    /// Issue one search query.
    ///
    /// Never fails: transport errors yield an empty sequence.
    pub async fn search(&self, query: &str) -> Vec<SearchHit> {
        let qualified = if self.recency_qualifier.is_empty() {
            query.to_string()
        } else {
            format!("{} {}", query, self.recency_qualifier)
        };

        debug!(query = %qualified, "Searching");

        match self.provider.search(&qualified, self.max_results).await {
            Ok(mut hits) => {
                hits.truncate(self.max_results);
                debug!(count = hits.len(), "Search returned hits");
                hits
            }
            Err(e) => {
                warn!(query = %qualified, error = %e, "Search failed, continuing without results");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted provider that records queries and returns a canned response
    struct ScriptedProvider {
        queries: Mutex<Vec<String>>,
        response: anyhow::Result<Vec<SearchHit>>,
    }

    impl ScriptedProvider {
        fn ok(hits: Vec<SearchHit>) -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                response: Ok(hits),
            }
        }

        fn failing() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                response: Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for ScriptedProvider {
        async fn search(&self, query: &str, _max: usize) -> anyhow::Result<Vec<SearchHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            match &self.response {
                Ok(hits) => Ok(hits.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            title: "t".into(),
            url: url.into(),
            snippet: "s".into(),
        }
    }

    #[tokio::test]
    async fn test_recency_qualifier_appended() {
        let provider = ScriptedProvider::ok(vec![]);
        let gateway = SearchGateway::new(provider);

        gateway.search("flood in riverdale").await;

        let queries = gateway.provider.queries.lock().unwrap();
        assert_eq!(queries[0], "flood in riverdale after:2020-01-01");
    }

    #[tokio::test]
    async fn test_provider_failure_yields_empty() {
        let gateway = SearchGateway::new(ScriptedProvider::failing());
        assert!(gateway.search("anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_result_cap_enforced() {
        let hits = vec![hit("a"), hit("b"), hit("c"), hit("d"), hit("e")];
        let gateway = SearchGateway::new(ScriptedProvider::ok(hits)).with_max_results(3);

        assert_eq!(gateway.search("q").await.len(), 3);
    }
}
