//! postcheck - Fact-check pipeline for social media posts
//!
//! Turns raw post text into a truth verdict and a bounded-length reply
//! draft. The pipeline is strictly sequential:
//!
//! source text → search queries → web search → article extraction →
//! fact-check narrative → verdict + reply
//!
//! # Architecture
//!
//! Every remote dependency degrades instead of failing: the completion
//! client retries, fails over to backup models, and finally synthesizes
//! deterministic fallback text; search failures shrink the evidence pool;
//! missing article bodies substitute titles and snippets. No failure path
//! inside the core surfaces as an error — callers inspect the report's
//! degraded-stage list instead. The price of that availability is that
//! verdicts are heuristic and can be wrong.
//!
//! # Modules
//!
//! - `adapters`: external service clients (completion, search, extraction)
//! - `core`: pipeline stages and orchestration
//! - `domain`: data structures (results, hits, excerpts, reports)
//! - `cli`: command-line plumbing
//!
//! # Usage
//!
//! ```bash
//! # Fact-check a post and draft a reply
//! postcheck check "Flood kills 50 in Riverdale" --register plain
//!
//! # Inspect intermediate stages
//! postcheck headlines "Flood kills 50 in Riverdale"
//! postcheck search "riverdale flood"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{
    ArticleSource, CompletionBackend, CompletionClient, ModelRoster, SearchProvider,
};
pub use crate::core::FactCheckPipeline;
pub use crate::domain::{
    CompletionRequest, CompletionResult, FactCheckReport, Register, ReplyDraft, SearchHit, Verdict,
};
