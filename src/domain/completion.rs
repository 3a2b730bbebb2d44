//! Completion request/result types.
//!
//! `CompletionResult` is a tagged union rather than a Result: every failure
//! inside the client resolves to usable text, and the `Degraded` tag is how
//! callers learn that text came from the local fallback generator instead
//! of the live model.

use serde::{Deserialize, Serialize};

/// Hard ceiling on tokens requested from the completion endpoint.
pub const MAX_COMPLETION_TOKENS: u32 = 1000;

/// A single completion request. Constructed per call, never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full prompt text (single user message)
    pub prompt: String,

    /// Sampling temperature in [0, 1]; passed through unclamped
    pub temperature: f32,

    /// Maximum tokens to generate (capped at MAX_COMPLETION_TOKENS)
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request, capping max_tokens at the endpoint ceiling
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens: max_tokens.min(MAX_COMPLETION_TOKENS),
        }
    }
}

/// Outcome of a completion call.
///
/// Both variants carry usable text. `Degraded` marks output synthesized by
/// the deterministic fallback generator after the live model (and all
/// backups) could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CompletionResult {
    /// Text produced by the live model
    Success { text: String },

    /// Text produced by the local fallback generator
    Degraded { text: String, reason: String },
}

impl CompletionResult {
    /// The generated text, regardless of origin
    pub fn text(&self) -> &str {
        match self {
            Self::Success { text } => text,
            Self::Degraded { text, .. } => text,
        }
    }

    /// True if this text came from the fallback generator
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Consume the result, keeping only the text
    pub fn into_text(self) -> String {
        match self {
            Self::Success { text } => text,
            Self::Degraded { text, .. } => text,
        }
    }
}
