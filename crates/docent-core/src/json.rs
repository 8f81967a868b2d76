//! Recovering JSON envelopes from model output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::{DocentError, DocentResult};

static CODE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)\s*```").expect("valid regex"));
static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

/// Strip `<think>` sections and unwrap a fenced code block, if present.
pub fn remove_code_blocks(content: &str) -> String {
    let content = THINK_RE.replace_all(content, "");
    let content = content.trim();

    match CODE_BLOCK_RE.captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => content.to_string(),
    }
}

/// Best-effort JSON object text: the fenced block if any, otherwise the span
/// from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> String {
    let cleaned = remove_code_blocks(text);
    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => cleaned[start..=end].to_string(),
        _ => cleaned,
    }
}

/// Parse a model response as `T`.
pub fn parse_envelope<T: DeserializeOwned>(response: &str) -> DocentResult<T> {
    let json = extract_json(response);
    if json.is_empty() {
        return Err(DocentError::parse("Model response was empty"));
    }
    serde_json::from_str(&json)
        .map_err(|e| DocentError::parse(format!("Failed to parse model response JSON: {}", e)))
}
