//! Verdicts, reply drafts, and the per-run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evidence::{EvidenceExcerpt, SearchHit};

/// Truth verdict derived from the fact-check narrative.
///
/// The derivation is lexical (keyword indicators over the narrative text),
/// not semantic entailment. It is a documented approximation: a narrative
/// can be misread. Consumers must treat this as best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Narrative affirms the post
    True,

    /// Narrative flags the post as false or misleading
    False,

    /// Narrative hedges; claims could not be verified either way
    Unverified,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::True => write!(f, "true"),
            Verdict::False => write!(f, "false"),
            Verdict::Unverified => write!(f, "unverified"),
        }
    }
}

/// Tonal register for a composed reply to a flagged post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Straight fact-check statement
    Plain,

    /// Joking tone
    Light,

    /// Sarcastic tone
    Sharp,
}

impl Default for Register {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::str::FromStr for Register {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "simple" => Ok(Register::Plain),
            "light" | "joking" => Ok(Register::Light),
            "sharp" | "sarcastic" => Ok(Register::Sharp),
            _ => anyhow::bail!("Unknown register: {}", s),
        }
    }
}

/// A composed reply, bounded to the platform character limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyDraft {
    /// Register the reply was rendered in
    pub register: Register,

    /// Reply text, at most 280 characters
    pub text: String,
}

/// Full output of one pipeline run.
///
/// The reply consumer only needs `verdict` and `reply`; the rest is kept
/// for observability (which stages degraded, what was searched, what was
/// read).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckReport {
    /// Unique identifier for this run
    pub run_id: Uuid,

    /// The post text that was checked
    pub source_text: String,

    /// Search queries used (generated or fallback)
    pub queries: Vec<String>,

    /// Deduplicated search hits, in first-seen order
    pub hits: Vec<SearchHit>,

    /// Evidence excerpts extracted from the hits
    pub excerpts: Vec<EvidenceExcerpt>,

    /// Fact-check narrative from the analyzer
    pub narrative: String,

    /// Lexical verdict over the narrative
    pub verdict: Verdict,

    /// Composed reply; absent when no evidence could be gathered
    pub reply: Option<ReplyDraft>,

    /// Names of stages that fell back to deterministic generation
    pub degraded_stages: Vec<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run completed
    pub completed_at: DateTime<Utc>,
}
