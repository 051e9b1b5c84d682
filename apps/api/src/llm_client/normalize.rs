//! Isolates the JSON object inside a model's free-text reply.
//!
//! Models wrap JSON in Markdown fences, prefix it with chatter, or append notes
//! (the fallback disclosure note among them). We keep everything from the first `{`
//! to the last `}` and leave decoding to the caller.

use std::sync::OnceLock;

use regex::Regex;

static OPENING_FENCE: OnceLock<Option<Regex>> = OnceLock::new();
static ANY_FENCE: OnceLock<Option<Regex>> = OnceLock::new();

fn opening_fence() -> Option<&'static Regex> {
    OPENING_FENCE
        .get_or_init(|| Regex::new(r"(?i)```json\s*").ok())
        .as_ref()
}

fn any_fence() -> Option<&'static Regex> {
    ANY_FENCE.get_or_init(|| Regex::new(r"```").ok()).as_ref()
}

/// Strips code fences and returns the `{ ... }` span of `text`.
///
/// Returns the fence-stripped text unchanged when it holds no `{` followed by a `}`,
/// and the literal `{}` when the fence patterns are unavailable.
pub fn normalize_json_reply(text: &str) -> String {
    let (Some(opening), Some(fence)) = (opening_fence(), any_fence()) else {
        return "{}".to_string();
    };

    let without_opening = opening.replace_all(text, "");
    let stripped = fence.replace_all(&without_opening, "");

    match (stripped.find('{'), stripped.rfind('}')) {
        (Some(start), Some(end)) if start < end => stripped[start..=end].to_string(),
        _ => stripped.into_owned(),
    }
}
