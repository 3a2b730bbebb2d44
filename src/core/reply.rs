//! Verdict classification and reply rendering.
//!
//! Classification is lexical: a fixed indicator list over the narrative
//! text, with an explicit true-phrase check that short-circuits the
//! indicator scan (a narrative can assert truth while quoting a falsehood).
//! Template selection is deterministic by design: a stable hash of the
//! input picks the template, so identical inputs always render identical
//! replies and tests can assert exact output.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::adapters::{CompletionBackend, CompletionClient};
use crate::domain::{CompletionRequest, Register, ReplyDraft, Verdict};

/// Platform ceiling; replies are clamped well under it
pub const PLATFORM_CHAR_LIMIT: usize = 280;

/// Replies longer than this are truncated by the final clamp
const CLAMP_THRESHOLD: usize = 270;

/// Truncation point leaving room for the ellipsis marker
const CLAMP_CUT: usize = 267;

/// Composed true-path replies longer than this get a compression pass
const COMPRESSION_THRESHOLD: usize = 250;

/// Truncation point when the compression pass is unusable
const COMPRESSION_CUT: usize = 225;

/// Phrases that assert the post is true; checked before the indicator scan
const TRUE_PHRASES: [&str; 4] = [
    "this tweet is true",
    "the tweet is true",
    "this post is true",
    "the post is true",
];

/// Indicators that the narrative flags the post as false or misleading.
///
/// Tunable, unvalidated constants kept for behavioral compatibility.
const FALSE_INDICATORS: [&str; 8] = [
    "false",
    "misleading",
    "incorrect",
    "untrue",
    "inaccurate",
    "no credible",
    "no evidence",
    "cannot be verified",
];

/// Markers that the narrative hedges rather than judging either way
const HEDGE_MARKERS: [&str; 3] = ["unverified", "partially true", "could not be verified"];

/// Markers selecting the key-point sentence for a flagged reply
const KEY_POINT_MARKERS: [&str; 4] = ["false", "incorrect", "untrue", "no evidence"];

/// Markers selecting the supporting-evidence sentence for an affirmative reply
const EVIDENCE_MARKERS: [&str; 4] = ["confirm", "support", "evidence", "verify"];

const DEFAULT_KEY_POINT: &str = "This post contains false information";

const LIGHT_TEMPLATES: [&str; 4] = [
    "Nice try, but nope! {}. Maybe check your sources next time?",
    "Well, that's what I call creative fiction! {}.",
    "In today's episode of 'Things That Never Happened'... {}.",
    "I checked the facts so you don't have to: {}. Better luck next time!",
];

const SHARP_TEMPLATES: [&str; 4] = [
    "Congratulations! This might be the most ridiculous thing I've read today. FACT: {}.",
    "Wow, did you get your 'facts' from a cereal box? {}. Do better.",
    "*Spits coffee* SERIOUSLY?! {}. Maybe try journalism school before posting.",
    "I'm dying of laughter! {}. Please don't quit your day job to become a reporter.",
];

const TRUE_TEMPLATES: [&str; 4] = [
    "Fact check: This appears to be accurate based on available information.",
    "This post checks out. The information appears to be factually correct.",
    "Our fact check confirms the accuracy of this information.",
    "The claims in this post are supported by credible sources.",
];

/// True when the narrative flags the post as false or misleading.
///
/// The true-phrase check runs first and short-circuits the indicator scan;
/// order matters and must be preserved.
pub fn is_flagged(narrative: &str) -> bool {
    let lower = narrative.to_lowercase();

    if TRUE_PHRASES.iter().any(|p| lower.contains(p)) {
        return false;
    }

    FALSE_INDICATORS.iter().any(|i| lower.contains(i))
}

/// Three-way verdict over the narrative, for the report.
///
/// Rendering stays keyed on the binary `is_flagged`; `Unverified` exists so
/// the reply consumer can distinguish a hedge from an affirmation.
pub fn verdict(narrative: &str) -> Verdict {
    let lower = narrative.to_lowercase();

    if TRUE_PHRASES.iter().any(|p| lower.contains(p)) {
        return Verdict::True;
    }
    if FALSE_INDICATORS.iter().any(|i| lower.contains(i)) {
        return Verdict::False;
    }
    if HEDGE_MARKERS.iter().any(|m| lower.contains(m)) {
        return Verdict::Unverified;
    }

    Verdict::True
}

/// Stable template selector: sha256 of the key, reduced modulo `n`.
///
/// Intentionally deterministic (not cryptographic, not time-seeded) so the
/// same input always selects the same template.
pub fn template_index(key: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }

    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % n as u64) as usize
}

/// Split on sentence terminators, keeping trimmed non-empty sentences
fn sentences(text: &str) -> Vec<&str> {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First sentence containing any marker, else the first sentence overall
fn pick_sentence<'a>(text: &'a str, markers: &[&str]) -> Option<&'a str> {
    let parts = sentences(text);

    parts
        .iter()
        .find(|s| {
            let lower = s.to_lowercase();
            markers.iter().any(|m| lower.contains(m))
        })
        .or_else(|| parts.first())
        .copied()
}

/// Render a reply for a flagged (false) verdict.
pub fn compose_false(register: Register, narrative: &str, source_text: &str) -> String {
    let key_point = pick_sentence(narrative, &KEY_POINT_MARKERS)
        .unwrap_or(DEFAULT_KEY_POINT)
        .to_string();

    match register {
        Register::Plain => format!("Fact check: {}.", key_point),
        Register::Light => {
            let template = LIGHT_TEMPLATES[template_index(source_text, LIGHT_TEMPLATES.len())];
            template.replacen("{}", &key_point, 1)
        }
        Register::Sharp => {
            let template = SHARP_TEMPLATES[template_index(source_text, SHARP_TEMPLATES.len())];
            template.replacen("{}", &key_point, 1)
        }
    }
}

/// Render a reply for an unflagged (true) verdict.
///
/// When the composed text runs long, the model is asked for a compressed
/// version; a Degraded, empty, or still-too-long compression falls back to
/// plain truncation.
pub async fn compose_true<B: CompletionBackend>(
    client: &mut CompletionClient<B>,
    narrative: &str,
) -> String {
    let template = TRUE_TEMPLATES[template_index(narrative, TRUE_TEMPLATES.len())];

    let sentence = sentences(narrative).into_iter().find(|s| {
        let lower = s.to_lowercase();
        EVIDENCE_MARKERS.iter().any(|m| lower.contains(m))
    });

    let composed = match sentence {
        Some(evidence) => format!("{} {}.", template, evidence),
        None => template.to_string(),
    };

    if composed.chars().count() <= COMPRESSION_THRESHOLD {
        return composed;
    }

    debug!(chars = composed.chars().count(), "Reply too long, requesting compression");

    let prompt = format!(
        "Please summarize this fact-check response to be under {} characters, while preserving the key factual information:\n\nOriginal response: {}\n\nConcise version:",
        COMPRESSION_THRESHOLD, composed
    );
    let result = client.generate(CompletionRequest::new(prompt, 0.1, 100)).await;
    let concise = result.text().trim();

    if !result.is_degraded()
        && !concise.is_empty()
        && concise.chars().count() <= COMPRESSION_THRESHOLD
    {
        return concise.to_string();
    }

    let cut: String = composed.chars().take(COMPRESSION_CUT).collect();
    format!("{}...", cut)
}

/// Final length clamp, applied to every reply before it leaves the
/// composer. Text over the threshold is cut to exactly 270 characters
/// including the 3-character ellipsis marker.
pub fn clamp_reply(text: &str) -> String {
    if text.chars().count() <= CLAMP_THRESHOLD {
        return text.to_string();
    }

    let cut: String = text.chars().take(CLAMP_CUT).collect();
    format!("{}...", cut)
}

/// Compose the final reply draft for a narrative.
pub async fn compose<B: CompletionBackend>(
    client: &mut CompletionClient<B>,
    register: Register,
    narrative: &str,
    source_text: &str,
) -> ReplyDraft {
    let text = if is_flagged(narrative) {
        compose_false(register, narrative, source_text)
    } else {
        compose_true(client, narrative).await
    };

    ReplyDraft {
        register,
        text: clamp_reply(&text),
    }
}
