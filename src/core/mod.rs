//! Core fact-check logic.
//!
//! This module contains:
//! - `headline`: turning post text into search-ready queries
//! - `analyze`: producing a fact-check narrative from gathered evidence
//! - `reply`: verdict classification and reply rendering
//! - `pipeline`: the orchestrator wiring the stages together

pub mod analyze;
pub mod headline;
pub mod pipeline;
pub mod reply;

pub use analyze::{Analysis, CapitalizedWordTokenizer, KeywordTokenizer, VerdictAnalyzer};
pub use headline::QueryPlan;
pub use pipeline::FactCheckPipeline;
